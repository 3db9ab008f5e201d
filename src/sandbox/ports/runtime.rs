//! Container runtime port used by the command executor.

use crate::sandbox::domain::{ContainerHandle, ContainerSpec, ExitStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for sandbox runtime operations.
pub type SandboxRuntimeResult<T> = Result<T, SandboxRuntimeError>;

/// Five-operation contract for an ephemeral container runtime.
///
/// The executor never relies on runtime-specific behaviour beyond these
/// calls, so any engine (or an in-memory double) can back it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SandboxRuntime: Send + Sync {
    /// Creates a container from `spec` without starting it.
    async fn create(&self, spec: &ContainerSpec) -> SandboxRuntimeResult<ContainerHandle>;

    /// Starts a created container.
    async fn start(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<()>;

    /// Blocks until the container exits.
    async fn wait(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<ExitStatus>;

    /// Returns combined stdout/stderr output.
    async fn logs(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<Vec<u8>>;

    /// Forcibly removes the container.
    async fn remove(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<()>;
}

/// Errors returned by sandbox runtime adapters.
#[derive(Debug, Clone, Error)]
pub enum SandboxRuntimeError {
    /// The runtime does not know the container.
    #[error("container {0} not found")]
    NotFound(ContainerHandle),

    /// The runtime reported a failure for a command it executed.
    #[error("container runtime command failed: {0}")]
    CommandFailed(String),

    /// Generic runtime failure.
    #[error("container runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl SandboxRuntimeError {
    /// Wraps an underlying runtime error.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
