//! The agent-facing action interface

use crate::Result;

/// A simulated agent driven state by state through an environment
///
/// The environment calls [`Agent::act`] once per visited state, passing that
/// state's true reward. The agent updates whatever internal learning state
/// it keeps and commits to the action to execute next. Terminal states are
/// announced through the same call; no transition follows them, but an
/// action slot is still returned.
pub trait Agent {
    /// Observe `reward` in `state` and choose the next action
    ///
    /// For non-terminal states the returned action must be a member of the
    /// state's available-action list.
    fn act(&mut self, state: usize, reward: f64) -> Result<usize>;
}
