//! Error types for agent domain validation.

use thiserror::Error;

/// Errors returned while constructing agent domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// The agent identifier is empty after trimming.
    #[error("agent id must not be empty")]
    EmptyAgentId,

    /// The agent identifier contains whitespace or control characters.
    #[error("agent id '{0}' must not contain whitespace or control characters")]
    InvalidAgentId(String),
}
