//! Finite-MDP planning and learning primitives
//!
//! This crate provides the data model for finite Markov decision processes
//! together with the dynamic-programming solvers that operate on a fully
//! known model: value iteration, policy evaluation, and policy iteration.
//! Learning agents and the trial simulator live in the companion crates.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod bellman;
pub mod error;
pub mod extremum;
pub mod mdp;
pub mod planning;
pub mod policy;

// Re-export core traits and types
pub use agent::Agent;
pub use bellman::{expected_utility, max_expected_utility};
pub use error::{Result, RlError};
pub use extremum::{arg_max_value, max_value};
pub use mdp::Mdp;
pub use planning::{policy_evaluation, policy_iteration, value_iteration, SolverConfig};
pub use policy::Policy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Agent, Mdp, Policy, Result, RlError, SolverConfig};
}
