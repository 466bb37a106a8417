//! Trial simulation for markov-rl
//!
//! The environment owns the true MDP, samples state transitions from its
//! probability model, and drives any [`markov_rl_core::Agent`] through
//! complete episodes. Agents only ever see the structural skeleton of the
//! model plus the per-step rewards the simulator hands them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod environment;

pub use environment::{Environment, Trial, DEFAULT_SEED};

// Re-export core types
pub use markov_rl_core::{Agent, Mdp, Result, RlError};
