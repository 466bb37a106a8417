//! Learning agents for markov-rl
//!
//! This crate provides the agents that interact with an environment purely
//! through the observe-reward/choose-action interface:
//! - Q-learning with an optimism-under-uncertainty exploration function
//! - Passive temporal-difference estimation under a fixed policy
//! - A fixed-policy agent for replaying planner output

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fixed;
pub mod qlearn;
pub mod schedule;
pub mod td;

// Re-export agents
pub use fixed::FixedPolicyAgent;
pub use qlearn::{QLearningAgent, QLearningConfig};
pub use td::PassiveTdAgent;

// Re-export utilities
pub use schedule::{Schedule, VisitDecaySchedule};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{FixedPolicyAgent, PassiveTdAgent, QLearningAgent, QLearningConfig};
    pub use markov_rl_core::prelude::*;
}
