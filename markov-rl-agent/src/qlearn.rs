//! Q-learning with an optimism-under-uncertainty exploration function

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use markov_rl_core::extremum::{arg_max_value, max_value};
use markov_rl_core::{Agent, Mdp, Result, RlError};

use crate::schedule::{Schedule, VisitDecaySchedule};

/// Hyperparameters for the Q-learning agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Discount factor, in (0, 1)
    pub gamma: f64,
    /// Optimistic estimate of the best attainable reward
    pub optimistic_reward: f64,
    /// Minimum number of attempts required per state-action pair
    pub min_visits: f64,
}

impl QLearningConfig {
    /// Exploration function `f(u, n)`
    ///
    /// Under-visited state-action pairs are valued at the optimistic reward
    /// so the agent keeps trying them; pairs visited at least `min_visits`
    /// times are valued by their current estimate.
    #[must_use]
    pub fn exploration_value(&self, utility: f64, visits: f64) -> f64 {
        if visits < self.min_visits {
            self.optimistic_reward
        } else {
            utility
        }
    }
}

/// The last state-action-reward triple awaiting its successor observation
#[derive(Debug, Clone, Copy)]
struct Pending {
    state: usize,
    action: usize,
    reward: f64,
}

/// Tabular Q-learning agent
///
/// Owns its visit-count and value tables exclusively; the model handed in
/// is the structural skeleton from the environment, so the agent sees
/// state/action cardinalities, action lists, and terminal flags, but never
/// the true rewards or dynamics.
pub struct QLearningAgent {
    mdp: Mdp,
    config: QLearningConfig,
    visits: Array2<f64>,
    values: Array2<f64>,
    schedule: VisitDecaySchedule,
    pending: Option<Pending>,
    last_action: usize,
}

impl QLearningAgent {
    /// Create an agent with zeroed tables over the model's skeleton
    pub fn new(mdp: Mdp, config: QLearningConfig) -> Result<Self> {
        if !(config.gamma > 0.0 && config.gamma < 1.0) {
            return Err(RlError::InvalidArgument(format!(
                "gamma must lie in (0, 1), got {}",
                config.gamma
            )));
        }
        let shape = (mdp.num_states, mdp.num_actions);
        Ok(Self {
            visits: Array2::zeros(shape),
            values: Array2::zeros(shape),
            schedule: VisitDecaySchedule::default(),
            pending: None,
            last_action: 0,
            config,
            mdp,
        })
    }

    /// The Q-value table, indexed `[[state, action]]`
    #[must_use]
    pub fn q_values(&self) -> &Array2<f64> {
        &self.values
    }

    /// The visit-count table, indexed `[[state, action]]`
    #[must_use]
    pub fn visit_counts(&self) -> &Array2<f64> {
        &self.visits
    }

    /// Learned utility of `state`
    ///
    /// The maximum Q-value over available actions, the stored terminal
    /// value for terminal states, or `None` for dead states.
    #[must_use]
    pub fn utility(&self, state: usize) -> Option<f64> {
        if self.mdp.num_available_actions(state) > 0 {
            Some(max_value(&self.mdp.actions[state], self.q_row(state)))
        } else if self.mdp.is_terminal(state) {
            Some(self.values[[state, 0]])
        } else {
            None
        }
    }

    /// Greedy action for `state`, or `None` for states without actions
    #[must_use]
    pub fn greedy_action(&self, state: usize) -> Option<usize> {
        if self.mdp.num_available_actions(state) > 0 {
            Some(arg_max_value(&self.mdp.actions[state], self.q_row(state)))
        } else {
            None
        }
    }

    fn q_row(&self, state: usize) -> &[f64] {
        self.values
            .row(state)
            .to_slice()
            .expect("Q-table rows are contiguous")
    }

    /// Pick the next action by the exploration function
    ///
    /// The scan compares each candidate against the currently selected
    /// action's exploration value, re-evaluated at every step, rather than
    /// against a saved running maximum; ties leave the earlier selection in
    /// place.
    fn select_action(&self, state: usize) -> usize {
        let actions = &self.mdp.actions[state];
        assert!(
            !actions.is_empty(),
            "select_action: state {state} has no available actions"
        );

        let mut selected = actions[0];
        for &candidate in &actions[1..] {
            let challenger =
                self.config
                    .exploration_value(self.values[[state, candidate]], self.visits[[state, candidate]]);
            let incumbent =
                self.config
                    .exploration_value(self.values[[state, selected]], self.visits[[state, selected]]);
            if challenger > incumbent {
                selected = candidate;
            }
        }
        selected
    }
}

impl Agent for QLearningAgent {
    fn act(&mut self, state: usize, reward: f64) -> Result<usize> {
        // Terminal states expose their reward as the value of every action.
        let max_q = if self.mdp.is_terminal(state) {
            for action in 0..self.mdp.num_actions {
                self.values[[state, action]] = reward;
            }
            reward
        } else {
            max_value(&self.mdp.actions[state], self.q_row(state))
        };

        if let Some(pending) = self.pending.take() {
            self.visits[[pending.state, pending.action]] += 1.0;
            let alpha = self
                .schedule
                .value(self.visits[[pending.state, pending.action]]);
            let q = self.values[[pending.state, pending.action]];
            self.values[[pending.state, pending.action]] =
                q + alpha * (pending.reward + self.config.gamma * max_q - q);
            trace!(
                state = pending.state,
                action = pending.action,
                alpha,
                "q-update"
            );
        }

        if !self.mdp.is_terminal(state) {
            let action = self.select_action(state);
            self.pending = Some(Pending {
                state,
                action,
                reward,
            });
            self.last_action = action;
        }

        Ok(self.last_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use markov_rl_core::planning::{value_iteration, SolverConfig};
    use markov_rl_env::Environment;

    fn config(gamma: f64, optimistic_reward: f64, min_visits: f64) -> QLearningConfig {
        QLearningConfig {
            gamma,
            optimistic_reward,
            min_visits,
        }
    }

    /// One non-terminal state deterministically feeding a terminal reward 10.
    fn chain() -> Mdp {
        Mdp {
            num_states: 2,
            num_actions: 1,
            start: 0,
            rewards: vec![0.0, 10.0],
            terminal: vec![false, true],
            actions: vec![vec![0], vec![]],
            transitions: vec![vec![vec![0.0, 1.0]], vec![vec![0.0, 0.0]]],
        }
    }

    /// Two actions from the start: a poor terminal and a rich terminal.
    fn fork() -> Mdp {
        Mdp {
            num_states: 3,
            num_actions: 2,
            start: 0,
            rewards: vec![0.0, 1.0, 5.0],
            terminal: vec![false, true, true],
            actions: vec![vec![0, 1], vec![], vec![]],
            transitions: vec![
                vec![vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
                vec![vec![0.0; 3]; 2],
                vec![vec![0.0; 3]; 2],
            ],
        }
    }

    #[test]
    fn terminal_reward_propagates_to_every_action_slot() {
        let mdp = chain();
        let mut agent = QLearningAgent::new(mdp.structural_copy(), config(0.9, 0.0, 0.0)).unwrap();

        agent.act(1, 10.0).unwrap();
        assert_eq!(agent.q_values()[[1, 0]], 10.0);
        assert_eq!(agent.utility(1), Some(10.0));
    }

    #[test]
    fn pending_transition_is_updated_on_the_next_observation() {
        let mdp = chain();
        let mut agent = QLearningAgent::new(mdp.structural_copy(), config(0.9, 0.0, 0.0)).unwrap();

        agent.act(0, 0.0).unwrap();
        agent.act(1, 10.0).unwrap();

        // First visit gets alpha = 1, so Q jumps straight to the TD target.
        assert_relative_eq!(agent.q_values()[[0, 0]], 9.0, epsilon = 1e-12);
        assert_eq!(agent.visit_counts()[[0, 0]], 1.0);
    }

    #[test]
    fn matches_value_iteration_on_a_deterministic_single_action_mdp() {
        let mdp = chain();
        let solver = SolverConfig::new(0.9, 0.01);
        let planned = value_iteration(&mdp, &solver).unwrap();

        let mut env = Environment::new(mdp.clone());
        let mut agent =
            QLearningAgent::new(env.structural_mdp(), config(0.9, 0.0, 0.0)).unwrap();
        env.run(&mut agent, 50).unwrap();

        let learned = agent.utility(0).unwrap();
        assert_relative_eq!(learned, planned[0], epsilon = 0.01);
        assert_relative_eq!(agent.utility(1).unwrap(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn under_visited_actions_are_forced_by_the_exploration_function() {
        let mdp = fork();
        let mut env = Environment::new(mdp.clone());
        let mut agent =
            QLearningAgent::new(env.structural_mdp(), config(0.9, 100.0, 2.0)).unwrap();

        // Both actions start optimistic, so ties keep selecting action 0
        // until it has been attempted min_visits times; only then does the
        // still-optimistic action 1 win the comparison.
        env.run(&mut agent, 3).unwrap();
        assert_eq!(agent.visit_counts()[[0, 0]], 2.0);
        assert_eq!(agent.visit_counts()[[0, 1]], 1.0);
    }

    #[test]
    fn exploration_value_switches_at_the_visit_threshold() {
        let config = config(0.9, 7.5, 3.0);
        assert_eq!(config.exploration_value(1.0, 2.0), 7.5);
        assert_eq!(config.exploration_value(1.0, 3.0), 1.0);
    }

    #[test]
    fn greedy_policy_prefers_the_richer_terminal() {
        let mdp = fork();
        let mut env = Environment::new(mdp.clone());
        let mut agent =
            QLearningAgent::new(env.structural_mdp(), config(0.9, 10.0, 1.0)).unwrap();
        env.run(&mut agent, 20).unwrap();

        assert_eq!(agent.greedy_action(0), Some(1));
        assert_eq!(agent.greedy_action(1), None);
        assert_eq!(agent.utility(2), Some(5.0));
    }

    #[test]
    fn dead_states_report_no_utility() {
        let mut mdp = chain();
        mdp.num_states = 3;
        mdp.rewards.push(0.0);
        mdp.terminal.push(false);
        mdp.actions.push(vec![]);
        mdp.transitions[0][0].push(0.0);
        mdp.transitions[1][0].push(0.0);
        mdp.transitions.push(vec![vec![0.0; 3]]);

        let agent = QLearningAgent::new(mdp.structural_copy(), config(0.9, 0.0, 0.0)).unwrap();
        assert_eq!(agent.utility(2), None);
        assert_eq!(agent.greedy_action(2), None);
    }

    #[test]
    fn rejects_out_of_domain_gamma() {
        let result = QLearningAgent::new(chain().structural_copy(), config(1.5, 0.0, 0.0));
        assert!(matches!(result, Err(RlError::InvalidArgument(_))));
    }
}
