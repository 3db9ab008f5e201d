//! Domain model for sandboxed command execution.
//!
//! Covers command-line parsing, per-agent allow-lists, read-only mounts and
//! the container description handed to a runtime. Infrastructure concerns
//! remain outside this boundary.

mod command;
mod container;
mod error;
mod policy;

pub use command::CommandLine;
pub use container::{ContainerHandle, ContainerSpec, ExitStatus, ReadOnlyMount, SandboxPhase};
pub use error::SandboxDomainError;
pub use policy::{AllowedCommands, AllowedPaths, SandboxPolicy};
