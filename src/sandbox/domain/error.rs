//! Error types for sandbox domain validation.

use thiserror::Error;

/// Errors returned while validating a command against a sandbox policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SandboxDomainError {
    /// The command line contains no tokens.
    #[error("command must not be empty")]
    EmptyCommand,

    /// The executable is not on the agent's allow-list.
    #[error("command '{command}' is not allowed")]
    CommandNotAllowed {
        /// The rejected executable name.
        command: String,
    },
}
