//! Agent that replays a fixed policy without learning

use markov_rl_core::{Agent, Policy, Result};

/// Follows a policy produced elsewhere, typically by a planner
///
/// Useful for running value-iteration or policy-iteration output through
/// the simulator; the agent keeps no state and ignores rewards.
pub struct FixedPolicyAgent {
    policy: Policy,
}

impl FixedPolicyAgent {
    /// Wrap a policy for replay
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// The wrapped policy
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

impl Agent for FixedPolicyAgent {
    fn act(&mut self, state: usize, _reward: f64) -> Result<usize> {
        Ok(self.policy.action(state))
    }
}
