//! Container description, handle and exit status value objects.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A host path bound read-only into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOnlyMount {
    host_path: Utf8PathBuf,
    container_path: Utf8PathBuf,
}

impl ReadOnlyMount {
    /// Mounts `host_path` at the same location inside the container.
    #[must_use]
    pub fn mirrored(host_path: Utf8PathBuf) -> Self {
        Self {
            container_path: host_path.clone(),
            host_path,
        }
    }

    /// Returns the host side of the mount.
    #[must_use]
    pub fn host_path(&self) -> &Utf8Path {
        &self.host_path
    }

    /// Returns the container side of the mount.
    #[must_use]
    pub fn container_path(&self) -> &Utf8Path {
        &self.container_path
    }

    /// Renders the mount in `host:container:ro` bind syntax.
    #[must_use]
    pub fn bind_spec(&self) -> String {
        format!("{}:{}:ro", self.host_path, self.container_path)
    }
}

/// Everything a runtime needs to create one single-use container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    image: String,
    argv: Vec<String>,
    mounts: Vec<ReadOnlyMount>,
}

impl ContainerSpec {
    /// Creates a container description.
    #[must_use]
    pub fn new(image: impl Into<String>, argv: Vec<String>, mounts: Vec<ReadOnlyMount>) -> Self {
        Self {
            image: image.into(),
            argv,
            mounts,
        }
    }

    /// Returns the base image reference.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Returns the argument vector, program first.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Returns the read-only mounts.
    #[must_use]
    pub fn mounts(&self) -> &[ReadOnlyMount] {
        &self.mounts
    }
}

/// Opaque runtime identifier for a created container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    /// Wraps a runtime-issued container identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Exit status reported by a finished container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus(i64);

impl ExitStatus {
    /// Wraps a raw exit code.
    #[must_use]
    pub const fn new(code: i64) -> Self {
        Self(code)
    }

    /// Returns the raw exit code.
    #[must_use]
    pub const fn code(self) -> i64 {
        self.0
    }

    /// Returns `true` for a zero exit code.
    #[must_use]
    pub const fn success(self) -> bool {
        self.0 == 0
    }
}

/// Stage of the container lifecycle, used to label sandbox failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxPhase {
    /// Creating the container.
    Create,
    /// Starting the container.
    Start,
    /// Waiting for the container to exit.
    Wait,
    /// Reading captured output.
    Logs,
}

impl SandboxPhase {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Start => "start",
            Self::Wait => "wait",
            Self::Logs => "logs",
        }
    }
}

impl fmt::Display for SandboxPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
