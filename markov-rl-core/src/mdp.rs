//! Finite Markov decision process model

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::{Result, RlError};

/// Tolerance when checking that a transition row sums to one
const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// A finite Markov decision process
///
/// The model is created once by a loader and is logically immutable
/// afterwards. [`Mdp::structural_copy`] derives the agent-visible skeleton
/// with rewards and dynamics zeroed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mdp {
    /// Number of states
    pub num_states: usize,
    /// Number of actions
    pub num_actions: usize,
    /// Index of the initial state
    pub start: usize,
    /// Reward for each state
    pub rewards: Vec<f64>,
    /// Terminal flag for each state
    pub terminal: Vec<bool>,
    /// Ordered legal actions per state; empty for dead or terminal states
    pub actions: Vec<Vec<usize>>,
    /// Transition probabilities indexed `[state][action][next_state]`
    pub transitions: Vec<Vec<Vec<f64>>>,
}

impl Mdp {
    /// Parse a model from a JSON reader and validate it
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let mdp: Mdp = serde_json::from_reader(reader)?;
        mdp.validate()?;
        Ok(mdp)
    }

    /// Load a model from a JSON file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Check every structural invariant of the model
    ///
    /// A valid model has consistent array lengths, a start state in range,
    /// action indices below `num_actions`, no actions in terminal states,
    /// and a probability distribution over next states for every available
    /// state-action pair.
    pub fn validate(&self) -> Result<()> {
        if self.num_states == 0 || self.num_actions == 0 {
            return Err(RlError::InvalidModel(
                "state and action cardinalities must be at least 1".into(),
            ));
        }
        if self.start >= self.num_states {
            return Err(RlError::InvalidModel(format!(
                "start state {} out of range for {} states",
                self.start, self.num_states
            )));
        }
        if self.rewards.len() != self.num_states
            || self.terminal.len() != self.num_states
            || self.actions.len() != self.num_states
            || self.transitions.len() != self.num_states
        {
            return Err(RlError::InvalidModel(format!(
                "per-state arrays must all have length {}",
                self.num_states
            )));
        }

        for state in 0..self.num_states {
            if self.transitions[state].len() != self.num_actions {
                return Err(RlError::InvalidModel(format!(
                    "state {state} has {} transition rows, expected {}",
                    self.transitions[state].len(),
                    self.num_actions
                )));
            }
            if self.terminal[state] && !self.actions[state].is_empty() {
                return Err(RlError::InvalidModel(format!(
                    "terminal state {state} must not have available actions"
                )));
            }
            for &action in &self.actions[state] {
                if action >= self.num_actions {
                    return Err(RlError::InvalidModel(format!(
                        "state {state} lists action {action}, but only {} exist",
                        self.num_actions
                    )));
                }
                let row = &self.transitions[state][action];
                if row.len() != self.num_states {
                    return Err(RlError::InvalidModel(format!(
                        "transition row ({state}, {action}) has length {}, expected {}",
                        row.len(),
                        self.num_states
                    )));
                }
                if row.iter().any(|&p| !(0.0..=1.0).contains(&p)) {
                    return Err(RlError::InvalidModel(format!(
                        "transition row ({state}, {action}) has a probability outside [0, 1]"
                    )));
                }
                let total: f64 = row.iter().sum();
                if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
                    return Err(RlError::InvalidModel(format!(
                        "transition row ({state}, {action}) sums to {total}, expected 1"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Deep copy with rewards and transition probabilities zeroed
    ///
    /// The copy shares no storage with the original; only cardinalities,
    /// the start state, terminal flags, and action lists survive. This is
    /// what learning agents may inspect without seeing the true dynamics.
    #[must_use]
    pub fn structural_copy(&self) -> Self {
        Self {
            num_states: self.num_states,
            num_actions: self.num_actions,
            start: self.start,
            rewards: vec![0.0; self.num_states],
            terminal: self.terminal.clone(),
            actions: self.actions.clone(),
            transitions: vec![vec![vec![0.0; self.num_states]; self.num_actions]; self.num_states],
        }
    }

    /// Number of actions available in `state`
    #[must_use]
    pub fn num_available_actions(&self, state: usize) -> usize {
        self.actions[state].len()
    }

    /// Whether `state` is terminal
    #[must_use]
    pub fn is_terminal(&self, state: usize) -> bool {
        self.terminal[state]
    }

    /// Reward observed in `state`
    #[must_use]
    pub fn reward(&self, state: usize) -> f64 {
        self.rewards[state]
    }

    /// Probability of moving to `next` when taking `action` in `state`
    #[must_use]
    pub fn transition_prob(&self, state: usize, action: usize, next: usize) -> f64 {
        self.transitions[state][action][next]
    }
}
