//! Port contracts for sandboxed command execution.

mod runtime;

#[cfg(test)]
pub use runtime::MockSandboxRuntime;
pub use runtime::{SandboxRuntime, SandboxRuntimeError, SandboxRuntimeResult};
