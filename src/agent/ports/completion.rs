//! Language-model completion port.

use crate::agent::domain::{CapabilityDeclaration, CapabilityInvocation, Turn};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for completion calls.
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Everything a provider needs to produce the next assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    history: Vec<Turn>,
    capabilities: Vec<CapabilityDeclaration>,
}

impl CompletionRequest {
    /// Creates a request from a history snapshot and declared capabilities.
    #[must_use]
    pub const fn new(history: Vec<Turn>, capabilities: Vec<CapabilityDeclaration>) -> Self {
        Self {
            history,
            capabilities,
        }
    }

    /// Returns the conversation so far.
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Returns the capabilities the model may invoke.
    #[must_use]
    pub fn capabilities(&self) -> &[CapabilityDeclaration] {
        &self.capabilities
    }
}

/// A provider's answer: text plus any capability invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    text: String,
    invocations: Vec<CapabilityInvocation>,
}

impl Completion {
    /// Creates a plain text completion.
    #[must_use]
    pub fn reply(text: impl Into<String>) -> Self {
        Self::with_invocations(text, Vec::new())
    }

    /// Creates a completion that requests capability invocations.
    #[must_use]
    pub fn with_invocations(text: impl Into<String>, invocations: Vec<CapabilityInvocation>) -> Self {
        Self {
            text: text.into(),
            invocations,
        }
    }

    /// Returns the text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the requested invocations.
    #[must_use]
    pub fn invocations(&self) -> &[CapabilityInvocation] {
        &self.invocations
    }

    /// Returns `true` when at least one invocation was requested.
    #[must_use]
    pub const fn has_invocations(&self) -> bool {
        !self.invocations.is_empty()
    }

    /// Splits the completion into text and invocations.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<CapabilityInvocation>) {
        (self.text, self.invocations)
    }
}

/// Stateless language-model client.
///
/// Each call carries the full history, so implementations keep nothing
/// between requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produces the next completion for `request`.
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion>;
}

/// Errors returned by completion providers.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// The provider rejected or failed the request.
    #[error("completion provider error: {0}")]
    Provider(String),

    /// Transport or other infrastructure failure.
    #[error("completion runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl CompletionError {
    /// Wraps an underlying runtime error.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
