//! Dynamic-programming solvers for a fully known MDP

use tracing::debug;

use crate::bellman::{expected_utility, max_expected_utility};
use crate::mdp::Mdp;
use crate::policy::Policy;
use crate::{Result, RlError};

/// Convergence parameters shared by the planning algorithms
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Discount factor, in (0, 1)
    pub gamma: f64,
    /// Maximum allowable state utility error
    pub epsilon: f64,
    /// Optional safety cap on sweeps per convergence loop
    ///
    /// Hitting the cap is reported as [`RlError::NoConvergence`], never
    /// passed off as a converged result.
    pub max_sweeps: Option<usize>,
}

impl SolverConfig {
    /// Uncapped configuration with the given discount and error bound
    #[must_use]
    pub fn new(gamma: f64, epsilon: f64) -> Self {
        Self {
            gamma,
            epsilon,
            max_sweeps: None,
        }
    }

    fn check(&self) -> Result<()> {
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return Err(RlError::InvalidArgument(format!(
                "gamma must lie in (0, 1), got {}",
                self.gamma
            )));
        }
        if self.epsilon <= 0.0 {
            return Err(RlError::InvalidArgument(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Compute optimal state utilities by value iteration
///
/// Starts from a zeroed utility table and applies Bellman sweeps until the
/// largest per-state change drops to `epsilon * (1 - gamma) / gamma`, the
/// standard bound guaranteeing utility error below `epsilon`. Terminal
/// states take their reward as utility; dead non-terminal states are left
/// untouched (callers report a sentinel for them).
pub fn value_iteration(mdp: &Mdp, config: &SolverConfig) -> Result<Vec<f64>> {
    config.check()?;

    let bound = config.epsilon * (1.0 - config.gamma) / config.gamma;
    let mut utilities = vec![0.0; mdp.num_states];
    let mut sweeps = 0;

    loop {
        let mut updated = vec![0.0; mdp.num_states];
        let mut delta = 0.0_f64;
        for state in 0..mdp.num_states {
            updated[state] = if mdp.terminal[state] {
                mdp.rewards[state]
            } else if mdp.actions[state].is_empty() {
                utilities[state]
            } else {
                let (meu, _) = max_expected_utility(mdp, state, &utilities);
                mdp.rewards[state] + config.gamma * meu
            };
            delta = delta.max((updated[state] - utilities[state]).abs());
        }
        utilities = updated;
        sweeps += 1;
        debug!(sweeps, delta, "value iteration sweep");

        if delta <= bound {
            return Ok(utilities);
        }
        if config.max_sweeps.is_some_and(|cap| sweeps >= cap) {
            return Err(RlError::NoConvergence { sweeps });
        }
    }
}

/// Estimate state utilities under a fixed policy
///
/// Identical sweep structure to value iteration but backing up the policy
/// action instead of the maximum, continuing from the caller's current
/// estimates. Stops once the largest change drops to `epsilon`; this bound
/// is intentionally looser than value iteration's scaled bound.
pub fn policy_evaluation(
    mdp: &Mdp,
    policy: &Policy,
    config: &SolverConfig,
    utilities: &mut [f64],
) -> Result<()> {
    config.check()?;
    policy.validate(mdp)?;
    if utilities.len() != mdp.num_states {
        return Err(RlError::InvalidArgument(format!(
            "utility table has {} entries, model has {} states",
            utilities.len(),
            mdp.num_states
        )));
    }

    let mut sweeps = 0;
    loop {
        let mut updated = vec![0.0; mdp.num_states];
        let mut delta = 0.0_f64;
        for state in 0..mdp.num_states {
            updated[state] = if mdp.terminal[state] {
                mdp.rewards[state]
            } else if mdp.actions[state].is_empty() {
                utilities[state]
            } else {
                mdp.rewards[state]
                    + config.gamma
                        * expected_utility(mdp, state, utilities, policy.action(state))
            };
            delta = delta.max((updated[state] - utilities[state]).abs());
        }
        utilities.copy_from_slice(&updated);
        sweeps += 1;
        debug!(sweeps, delta, "policy evaluation sweep");

        if delta <= config.epsilon {
            return Ok(());
        }
        if config.max_sweeps.is_some_and(|cap| sweeps >= cap) {
            return Err(RlError::NoConvergence { sweeps });
        }
    }
}

/// Optimize a policy in place by alternating evaluation and improvement
///
/// Each round evaluates the current policy to convergence and then greedily
/// improves every state whose policy action is beaten by the maximizing
/// action. Stops when a full improvement sweep changes nothing; the final
/// utilities are returned alongside the optimized policy.
pub fn policy_iteration(mdp: &Mdp, config: &SolverConfig, policy: &mut Policy) -> Result<Vec<f64>> {
    config.check()?;
    policy.validate(mdp)?;

    let mut utilities = vec![0.0; mdp.num_states];
    let mut rounds = 0;

    loop {
        policy_evaluation(mdp, policy, config, &mut utilities)?;

        let mut changed = false;
        for state in 0..mdp.num_states {
            if mdp.terminal[state] || mdp.actions[state].is_empty() {
                continue;
            }
            let (meu, greedy) = max_expected_utility(mdp, state, &utilities);
            let current = expected_utility(mdp, state, &utilities, policy.action(state));
            if meu > current {
                policy.set(state, greedy);
                changed = true;
            }
        }
        rounds += 1;
        debug!(rounds, changed, "policy iteration round");

        if !changed {
            return Ok(utilities);
        }
        if config.max_sweeps.is_some_and(|cap| rounds >= cap) {
            return Err(RlError::NoConvergence { sweeps: rounds });
        }
    }
}
