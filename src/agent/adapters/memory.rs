//! Scripted completion provider for tests and deterministic local flows.

use crate::agent::{
    domain::CapabilityInvocation,
    ports::{Completion, CompletionError, CompletionProvider, CompletionRequest, CompletionResult},
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// Completion provider that replays queued answers in order.
///
/// Every request is recorded. Once the script runs out each call fails with
/// [`CompletionError::Provider`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedCompletionProvider {
    state: Arc<RwLock<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    script: VecDeque<CompletionResult<Completion>>,
    requests: Vec<CompletionRequest>,
}

fn lock_error(err: &impl ToString) -> CompletionError {
    CompletionError::runtime(std::io::Error::other(err.to_string()))
}

impl ScriptedCompletionProvider {
    /// Creates a provider with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: CompletionResult<Completion>) -> CompletionResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.script.push_back(entry);
        Ok(())
    }

    /// Queues a plain text reply.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn push_reply(&self, text: impl Into<String>) -> CompletionResult<()> {
        self.push(Ok(Completion::reply(text)))
    }

    /// Queues a completion requesting `invocations`.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn push_invocations(
        &self,
        text: impl Into<String>,
        invocations: Vec<CapabilityInvocation>,
    ) -> CompletionResult<()> {
        self.push(Ok(Completion::with_invocations(text, invocations)))
    }

    /// Queues a provider failure.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn push_failure(&self, message: impl Into<String>) -> CompletionResult<()> {
        self.push(Err(CompletionError::Provider(message.into())))
    }

    /// Returns every request received so far.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn requests(&self) -> CompletionResult<Vec<CompletionRequest>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.requests.clone())
    }

    /// Returns how many scripted answers remain.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn remaining(&self) -> CompletionResult<usize> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.script.len())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.requests.push(request.clone());
        state.script.pop_front().unwrap_or_else(|| {
            Err(CompletionError::Provider(
                "completion script exhausted".to_owned(),
            ))
        })
    }
}
