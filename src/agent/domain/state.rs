//! Processing states of the agent loop.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an agent is in processing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Waiting for the next command.
    Idle,
    /// First completion request in flight.
    AwaitingCompletion,
    /// Running capability invocations.
    DispatchingTools,
    /// Follow-up completion request in flight.
    AwaitingFinalCompletion,
    /// The agent has stopped and accepts nothing further.
    Terminated,
}

impl AgentState {
    /// Returns the canonical state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingCompletion => "awaiting_completion",
            Self::DispatchingTools => "dispatching_tools",
            Self::AwaitingFinalCompletion => "awaiting_final_completion",
            Self::Terminated => "terminated",
        }
    }

    /// Returns `true` when moving from `self` to `target` is allowed.
    ///
    /// Any live state may terminate. A command that needs no tool dispatch
    /// may still take a follow-up completion for drained bus messages.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::AwaitingCompletion)
                | (
                    Self::AwaitingCompletion,
                    Self::DispatchingTools | Self::AwaitingFinalCompletion | Self::Idle
                )
                | (Self::DispatchingTools, Self::AwaitingFinalCompletion)
                | (Self::AwaitingFinalCompletion, Self::Idle)
                | (
                    Self::Idle
                        | Self::AwaitingCompletion
                        | Self::DispatchingTools
                        | Self::AwaitingFinalCompletion,
                    Self::Terminated
                )
        )
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
