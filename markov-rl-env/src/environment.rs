//! Environment simulator for stochastic MDP trials

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{debug, trace};

use markov_rl_core::{Agent, Mdp, Result, RlError};

/// Default seed for the transition-sampling stream
pub const DEFAULT_SEED: u64 = 42;

/// Summary of one simulated episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    /// Number of agent decisions, the terminal observation included
    pub steps: usize,
    /// Sum of rewards observed along the episode
    pub total_reward: f64,
}

/// Simulator owning the true MDP and a seeded random stream
///
/// The true rewards and transition probabilities never leave this struct;
/// [`Environment::structural_mdp`] is the only model view agents get, and
/// rewards reach them solely as per-step arguments to [`Agent::act`].
pub struct Environment {
    mdp: Mdp,
    rng: StdRng,
}

impl Environment {
    /// Wrap a validated model with the default sampling seed
    #[must_use]
    pub fn new(mdp: Mdp) -> Self {
        Self::with_seed(mdp, DEFAULT_SEED)
    }

    /// Wrap a validated model with an explicit sampling seed
    #[must_use]
    pub fn with_seed(mdp: Mdp, seed: u64) -> Self {
        Self {
            mdp,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Load the true MDP from a JSON file
    ///
    /// A load failure leaves no meaningful computation possible, so callers
    /// treat it as fatal.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Mdp::load(path)?))
    }

    /// Number of states in the underlying model
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.mdp.num_states
    }

    /// Number of actions in the underlying model
    #[must_use]
    pub fn num_actions(&self) -> usize {
        self.mdp.num_actions
    }

    /// Independently owned model skeleton with rewards and dynamics zeroed
    #[must_use]
    pub fn structural_mdp(&self) -> Mdp {
        self.mdp.structural_copy()
    }

    /// Run exactly `trials` independent episodes
    ///
    /// Nothing persists across trials except whatever the agent itself
    /// keeps.
    pub fn run(&mut self, agent: &mut dyn Agent, trials: usize) -> Result<Vec<Trial>> {
        let mut results = Vec::with_capacity(trials);
        for trial in 0..trials {
            let result = self.run_trial(agent)?;
            debug!(
                trial,
                steps = result.steps,
                total_reward = result.total_reward,
                "trial finished"
            );
            results.push(result);
        }
        Ok(results)
    }

    /// Simulate one episode from the start state to a terminal state
    ///
    /// Each step observes the current state's true reward, lets the agent
    /// update and choose an action, and then samples the successor from the
    /// transition distribution. Terminal states end the episode with no
    /// further transition.
    pub fn run_trial(&mut self, agent: &mut dyn Agent) -> Result<Trial> {
        let mut state = self.mdp.start;
        let mut steps = 0;
        let mut total_reward = 0.0;

        loop {
            let reward = self.mdp.reward(state);
            total_reward += reward;

            let action = agent.act(state, reward)?;
            steps += 1;

            if self.mdp.is_terminal(state) {
                break;
            }
            if !self.mdp.actions[state].contains(&action) {
                return Err(RlError::InvalidAction { state, action });
            }

            let next = self.sample_next(state, action);
            trace!(state, action, next, "transition");
            state = next;
        }

        Ok(Trial {
            steps,
            total_reward,
        })
    }

    /// Sample the successor of `(state, action)` with one uniform draw
    fn sample_next(&mut self, state: usize, action: usize) -> usize {
        let draw: f64 = self.rng.gen();
        self.next_state_for(state, action, draw)
    }

    /// Walk the cumulative distribution until it passes `draw`
    ///
    /// If rounding keeps the cumulative sum from ever exceeding the draw,
    /// the last state index is selected.
    fn next_state_for(&self, state: usize, action: usize, draw: f64) -> usize {
        let mut cumulative = 0.0;
        for next in 0..self.mdp.num_states {
            cumulative += self.mdp.transition_prob(state, action, next);
            if cumulative > draw {
                return next;
            }
        }
        self.mdp.num_states - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Agent that always plays action 0 and records every observation.
    struct Recorder {
        seen: Vec<(usize, f64)>,
    }

    impl Recorder {
        fn new() -> Self {
            Self { seen: Vec::new() }
        }
    }

    impl Agent for Recorder {
        fn act(&mut self, state: usize, reward: f64) -> Result<usize> {
            self.seen.push((state, reward));
            Ok(0)
        }
    }

    /// Deterministic chain 0 -> 1 -> 2 with terminal reward 10.
    fn chain() -> Mdp {
        Mdp {
            num_states: 3,
            num_actions: 1,
            start: 0,
            rewards: vec![-1.0, -1.0, 10.0],
            terminal: vec![false, false, true],
            actions: vec![vec![0], vec![0], vec![]],
            transitions: vec![
                vec![vec![0.0, 1.0, 0.0]],
                vec![vec![0.0, 0.0, 1.0]],
                vec![vec![0.0; 3]],
            ],
        }
    }

    #[test]
    fn point_mass_transitions_make_trials_deterministic() {
        let mut env = Environment::new(chain());
        let mut agent = Recorder::new();

        let trial = env.run_trial(&mut agent).unwrap();

        assert_eq!(
            agent.seen,
            vec![(0, -1.0), (1, -1.0), (2, 10.0)],
            "every state on the chain is visited exactly once"
        );
        assert_eq!(trial.steps, 3);
        assert_relative_eq!(trial.total_reward, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn run_executes_exactly_the_requested_trials() {
        let mut env = Environment::new(chain());
        let mut agent = Recorder::new();

        let trials = env.run(&mut agent, 5).unwrap();
        assert_eq!(trials.len(), 5);
        assert_eq!(agent.seen.len(), 15);
    }

    #[test]
    fn structural_copy_hides_rewards_and_dynamics() {
        let env = Environment::new(chain());
        let skeleton = env.structural_mdp();

        assert_eq!(skeleton.num_states, 3);
        assert_eq!(skeleton.terminal, vec![false, false, true]);
        assert!(skeleton.rewards.iter().all(|&r| r == 0.0));
        assert!(skeleton
            .transitions
            .iter()
            .flatten()
            .flatten()
            .all(|&p| p == 0.0));
    }

    #[test]
    fn cumulative_scan_stops_at_the_first_passing_state() {
        let mut mdp = chain();
        mdp.transitions[0][0] = vec![0.25, 0.25, 0.5];
        let env = Environment::new(mdp);

        assert_eq!(env.next_state_for(0, 0, 0.0), 0);
        assert_eq!(env.next_state_for(0, 0, 0.24), 0);
        assert_eq!(env.next_state_for(0, 0, 0.25), 1);
        assert_eq!(env.next_state_for(0, 0, 0.49), 1);
        assert_eq!(env.next_state_for(0, 0, 0.5), 2);
        assert_eq!(env.next_state_for(0, 0, 0.99), 2);
    }

    #[test]
    fn rounding_shortfall_falls_back_to_the_last_state() {
        let mut mdp = chain();
        // Sums to just under one, inside the validation tolerance.
        mdp.transitions[0][0] = vec![1.0 - 5e-7, 0.0, 0.0];
        mdp.validate().unwrap();
        let env = Environment::new(mdp);

        assert_eq!(env.next_state_for(0, 0, 1.0 - 1e-9), 2);
    }

    #[test]
    fn illegal_agent_action_is_reported() {
        struct Rogue;
        impl Agent for Rogue {
            fn act(&mut self, _state: usize, _reward: f64) -> Result<usize> {
                Ok(7)
            }
        }

        let mut env = Environment::new(chain());
        let result = env.run_trial(&mut Rogue);
        assert!(matches!(
            result,
            Err(RlError::InvalidAction { state: 0, action: 7 })
        ));
    }
}
