//! Per-state action assignments

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::mdp::Mdp;
use crate::{Result, RlError};

/// Default seed for random policy construction
pub const DEFAULT_POLICY_SEED: u64 = 42;

/// A deterministic policy: one action index per state
///
/// Entries for states without available actions are placeholders (zero) and
/// are never executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy(Vec<usize>);

impl Policy {
    /// Wrap an explicit action assignment
    #[must_use]
    pub fn new(actions: Vec<usize>) -> Self {
        Self(actions)
    }

    /// All-zero policy for `num_states` states
    #[must_use]
    pub fn zeroed(num_states: usize) -> Self {
        Self(vec![0; num_states])
    }

    /// Seeded random policy choosing a legal action wherever one exists
    #[must_use]
    pub fn random(mdp: &Mdp, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut actions = vec![0; mdp.num_states];
        for (state, slot) in actions.iter_mut().enumerate() {
            let available = &mdp.actions[state];
            if !available.is_empty() {
                *slot = available[rng.gen_range(0..available.len())];
            }
        }
        Self(actions)
    }

    /// Parse a policy from a textual source
    ///
    /// Expects exactly one whitespace-separated action index per state and
    /// validates each entry against the model's action lists.
    pub fn from_reader<R: Read>(mut reader: R, mdp: &Mdp) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let mut actions = Vec::with_capacity(mdp.num_states);
        for token in text.split_whitespace() {
            let action = token.parse::<usize>().map_err(|_| {
                RlError::InvalidPolicy(format!("illegal non-numeric action '{token}'"))
            })?;
            actions.push(action);
        }

        let policy = Self(actions);
        policy.validate(mdp)?;
        Ok(policy)
    }

    /// Check that the policy fits `mdp`
    ///
    /// The length must match the state count and every entry for a state
    /// with available actions must be a member of that state's action list.
    pub fn validate(&self, mdp: &Mdp) -> Result<()> {
        if self.0.len() != mdp.num_states {
            return Err(RlError::InvalidPolicy(format!(
                "policy has {} entries, model has {} states",
                self.0.len(),
                mdp.num_states
            )));
        }
        for (state, &action) in self.0.iter().enumerate() {
            let available = &mdp.actions[state];
            if !available.is_empty() && !available.contains(&action) {
                return Err(RlError::InvalidPolicy(format!(
                    "action {action} is not available in state {state}"
                )));
            }
        }
        Ok(())
    }

    /// Action assigned to `state`
    #[must_use]
    pub fn action(&self, state: usize) -> usize {
        self.0[state]
    }

    /// Reassign the action for `state`
    pub fn set(&mut self, state: usize, action: usize) {
        self.0[state] = action;
    }

    /// View the policy as a slice of action indices
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of states covered by the policy
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the policy covers no states
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
