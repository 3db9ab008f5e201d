//! Runs one allow-listed command inside a single-use container.

use crate::sandbox::{
    domain::{
        ContainerHandle, ContainerSpec, ExitStatus, SandboxDomainError, SandboxPhase,
        SandboxPolicy,
    },
    ports::{SandboxRuntime, SandboxRuntimeError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Captured result of a sandboxed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    exit_status: ExitStatus,
    output: String,
}

impl CommandOutput {
    /// Creates a command output.
    #[must_use]
    pub fn new(exit_status: ExitStatus, output: impl Into<String>) -> Self {
        Self {
            exit_status,
            output: output.into(),
        }
    }

    /// Returns the container exit status.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    /// Returns combined stdout/stderr text.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Renders the output for a conversation turn, flagging non-zero exits.
    #[must_use]
    pub fn render(&self) -> String {
        if self.exit_status.success() {
            self.output.clone()
        } else {
            format!(
                "{}\n[exit status {}]",
                self.output.trim_end(),
                self.exit_status.code()
            )
        }
    }
}

/// Errors raised while executing a sandboxed command.
#[derive(Debug, Clone, Error)]
pub enum CommandExecutionError {
    /// The command was rejected before any container was created.
    #[error(transparent)]
    Policy(#[from] SandboxDomainError),

    /// A container lifecycle step failed.
    #[error("sandbox {phase} failed: {source}")]
    Sandbox {
        /// The failing lifecycle step.
        phase: SandboxPhase,
        /// The runtime error.
        #[source]
        source: SandboxRuntimeError,
    },
}

impl CommandExecutionError {
    fn sandbox(phase: SandboxPhase) -> impl FnOnce(SandboxRuntimeError) -> Self {
        move |source| Self::Sandbox { phase, source }
    }

    /// Returns the failing phase for sandbox failures.
    #[must_use]
    pub const fn phase(&self) -> Option<SandboxPhase> {
        match self {
            Self::Sandbox { phase, .. } => Some(*phase),
            Self::Policy(_) => None,
        }
    }
}

/// Result type for command execution.
pub type CommandExecutionResult<T> = Result<T, CommandExecutionError>;

/// Executes allow-listed commands in ephemeral containers.
#[derive(Clone)]
pub struct CommandExecutor {
    runtime: Arc<dyn SandboxRuntime>,
    image: String,
}

impl CommandExecutor {
    /// Creates an executor using `image` as the base for every container.
    #[must_use]
    pub fn new(runtime: Arc<dyn SandboxRuntime>, image: impl Into<String>) -> Self {
        Self {
            runtime,
            image: image.into(),
        }
    }

    /// Returns the base image.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Runs `raw` under `policy` and returns the captured output.
    ///
    /// The container is always removed once it has been created, whether or
    /// not the later phases succeed. If the returned future is dropped part
    /// way through, removal is spawned onto the current Tokio runtime.
    /// There is no timeout: a command that never exits blocks the caller
    /// until the caller gives up.
    ///
    /// # Errors
    ///
    /// Returns [`CommandExecutionError::Policy`] for empty or disallowed
    /// commands, and [`CommandExecutionError::Sandbox`] naming the phase
    /// that failed.
    pub async fn execute(
        &self,
        raw: &str,
        policy: &SandboxPolicy,
    ) -> CommandExecutionResult<CommandOutput> {
        let line = policy.authorise(raw)?;
        let spec = ContainerSpec::new(&self.image, line.into_argv(), policy.paths().mounts());

        let handle = self
            .runtime
            .create(&spec)
            .await
            .map_err(CommandExecutionError::sandbox(SandboxPhase::Create))?;
        debug!(container = %handle, image = %self.image, "sandbox container created");

        let lease = ContainerLease::new(Arc::clone(&self.runtime), handle.clone());
        let outcome = self.run_created(&handle).await;
        lease.release().await;
        outcome
    }

    async fn run_created(&self, handle: &ContainerHandle) -> CommandExecutionResult<CommandOutput> {
        self.runtime
            .start(handle)
            .await
            .map_err(CommandExecutionError::sandbox(SandboxPhase::Start))?;
        let exit_status = self
            .runtime
            .wait(handle)
            .await
            .map_err(CommandExecutionError::sandbox(SandboxPhase::Wait))?;
        let bytes = self
            .runtime
            .logs(handle)
            .await
            .map_err(CommandExecutionError::sandbox(SandboxPhase::Logs))?;
        Ok(CommandOutput::new(
            exit_status,
            String::from_utf8_lossy(&bytes),
        ))
    }
}

async fn remove_container(runtime: &dyn SandboxRuntime, handle: &ContainerHandle) {
    if let Err(err) = runtime.remove(handle).await {
        warn!(container = %handle, error = %err, "failed to remove sandbox container");
    }
}

/// Owns a created container until it has been removed.
///
/// Dropping an unreleased lease spawns the removal instead, so a cancelled
/// command does not leak its container.
struct ContainerLease {
    runtime: Arc<dyn SandboxRuntime>,
    handle: Option<ContainerHandle>,
}

impl ContainerLease {
    const fn new(runtime: Arc<dyn SandboxRuntime>, handle: ContainerHandle) -> Self {
        Self {
            runtime,
            handle: Some(handle),
        }
    }

    async fn release(mut self) {
        if let Some(handle) = self.handle.take() {
            remove_container(self.runtime.as_ref(), &handle).await;
        }
    }
}

impl Drop for ContainerLease {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let Ok(tokio_runtime) = tokio::runtime::Handle::try_current() else {
            warn!(container = %handle, "no async runtime left to remove abandoned sandbox container");
            return;
        };
        debug!(container = %handle, "removing sandbox container of an abandoned command");
        let runtime = Arc::clone(&self.runtime);
        drop(tokio_runtime.spawn(async move {
            remove_container(runtime.as_ref(), &handle).await;
        }));
    }
}
