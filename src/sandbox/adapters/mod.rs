//! Adapter implementations for the sandbox runtime port.

mod docker;
mod memory;

pub use docker::DockerCliRuntime;
pub use memory::InMemorySandboxRuntime;
