//! Container CLI runtime adapter.
//!
//! Drives a Docker-compatible CLI with `tokio::process::Command`. Every
//! argument is passed programmatically, never through a shell. A CLI call
//! whose future is dropped kills its child process.
//!
//! `logs` reports the container's stdout followed by its stderr. The CLI
//! pipes the two streams separately, so their original interleaving is lost.

use crate::sandbox::{
    domain::{ContainerHandle, ContainerSpec, ExitStatus},
    ports::{SandboxRuntime, SandboxRuntimeError, SandboxRuntimeResult},
};
use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Default container CLI binary.
const DEFAULT_BINARY: &str = "docker";

/// Sandbox runtime backed by a Docker-compatible command-line client.
#[derive(Debug, Clone)]
pub struct DockerCliRuntime {
    binary: String,
}

impl DockerCliRuntime {
    /// Creates an adapter that invokes `binary` (for example `docker` or
    /// `podman`).
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Returns the configured CLI binary.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn invoke(&self, args: Vec<String>) -> SandboxRuntimeResult<Output> {
        debug!(binary = %self.binary, args = ?args, "invoking container cli");
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(SandboxRuntimeError::runtime)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(SandboxRuntimeError::CommandFailed(format!(
                "{} {} exited with {}: {stderr}",
                self.binary,
                args.first().map_or("", String::as_str),
                output.status
            )));
        }
        Ok(output)
    }
}

impl Default for DockerCliRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

/// Builds the `create` argument list for a container specification.
fn create_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec!["create".to_owned()];
    for mount in spec.mounts() {
        args.push("--volume".to_owned());
        args.push(mount.bind_spec());
    }
    args.push(spec.image().to_owned());
    args.extend(spec.argv().iter().cloned());
    args
}

/// Concatenates a CLI call's stdout and stderr, in that order.
fn combined_output(output: Output) -> Vec<u8> {
    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);
    combined
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

#[async_trait]
impl SandboxRuntime for DockerCliRuntime {
    async fn create(&self, spec: &ContainerSpec) -> SandboxRuntimeResult<ContainerHandle> {
        let output = self.invoke(create_args(spec)).await?;
        let id = stdout_text(&output);
        if id.is_empty() {
            return Err(SandboxRuntimeError::CommandFailed(
                "create returned no container id".to_owned(),
            ));
        }
        Ok(ContainerHandle::new(id))
    }

    async fn start(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<()> {
        self.invoke(vec!["start".to_owned(), handle.as_str().to_owned()])
            .await?;
        Ok(())
    }

    async fn wait(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<ExitStatus> {
        let output = self
            .invoke(vec!["wait".to_owned(), handle.as_str().to_owned()])
            .await?;
        let raw = stdout_text(&output);
        let code = raw.parse::<i64>().map_err(|err| {
            SandboxRuntimeError::CommandFailed(format!("unparsable exit status '{raw}': {err}"))
        })?;
        Ok(ExitStatus::new(code))
    }

    async fn logs(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<Vec<u8>> {
        let output = self
            .invoke(vec!["logs".to_owned(), handle.as_str().to_owned()])
            .await?;
        Ok(combined_output(output))
    }

    async fn remove(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<()> {
        self.invoke(vec![
            "rm".to_owned(),
            "--force".to_owned(),
            handle.as_str().to_owned(),
        ])
        .await?;
        Ok(())
    }
}
