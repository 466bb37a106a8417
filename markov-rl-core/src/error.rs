//! Error types for the markov-rl crates

use thiserror::Error;

/// Core error type for model, policy, and solver operations
#[derive(Error, Debug)]
pub enum RlError {
    /// Malformed or inconsistent MDP description
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Policy that does not fit the model
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// Out-of-domain solver or agent parameter
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Action not legal in the given state
    #[error("action {action} is not available in state {state}")]
    InvalidAction {
        /// State the action was attempted in
        state: usize,
        /// The offending action index
        action: usize,
    },

    /// Iteration cap reached before the stopping bound was met
    #[error("no convergence after {sweeps} sweeps")]
    NoConvergence {
        /// Number of sweeps completed before giving up
        sweeps: usize,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for markov-rl operations
pub type Result<T> = std::result::Result<T, RlError>;
