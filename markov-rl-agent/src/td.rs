//! Passive temporal-difference utility estimation under a fixed policy

use tracing::trace;

use markov_rl_core::{Agent, Mdp, Policy, Result, RlError};

use crate::schedule::{Schedule, VisitDecaySchedule};

/// Passive TD(0) agent
///
/// Follows the supplied policy without ever deviating and estimates the
/// utility of each state from the rewards the environment hands it. Like
/// the Q-learning agent it keeps a single-slot memory of the most recent
/// non-terminal observation, keyed by state only since the action is fixed
/// by the policy.
pub struct PassiveTdAgent {
    mdp: Mdp,
    policy: Policy,
    gamma: f64,
    utilities: Vec<f64>,
    visits: Vec<f64>,
    schedule: VisitDecaySchedule,
    pending: Option<(usize, f64)>,
}

impl PassiveTdAgent {
    /// Create an agent with zeroed tables following `policy`
    ///
    /// The model is the structural skeleton from the environment; the
    /// policy must fit it.
    pub fn new(mdp: Mdp, policy: Policy, gamma: f64) -> Result<Self> {
        if !(gamma > 0.0 && gamma < 1.0) {
            return Err(RlError::InvalidArgument(format!(
                "gamma must lie in (0, 1), got {gamma}"
            )));
        }
        policy.validate(&mdp)?;
        Ok(Self {
            utilities: vec![0.0; mdp.num_states],
            visits: vec![0.0; mdp.num_states],
            schedule: VisitDecaySchedule::default(),
            pending: None,
            policy,
            gamma,
            mdp,
        })
    }

    /// The estimated utility table, one value per state
    #[must_use]
    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    /// The per-state visit counts
    #[must_use]
    pub fn visit_counts(&self) -> &[f64] {
        &self.visits
    }
}

impl Agent for PassiveTdAgent {
    fn act(&mut self, state: usize, reward: f64) -> Result<usize> {
        // Terminal utilities are pinned to the observed reward so the
        // backup below propagates the true episode value.
        if self.mdp.is_terminal(state) {
            self.utilities[state] = reward;
        }

        if let Some((prev_state, prev_reward)) = self.pending.take() {
            self.visits[prev_state] += 1.0;
            let alpha = self.schedule.value(self.visits[prev_state]);
            self.utilities[prev_state] += alpha
                * (prev_reward + self.gamma * self.utilities[state] - self.utilities[prev_state]);
            trace!(state = prev_state, alpha, "td-update");
        }

        if !self.mdp.is_terminal(state) {
            self.pending = Some((state, reward));
        }

        Ok(self.policy.action(state))
    }
}
