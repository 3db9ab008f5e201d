//! Registry services.

mod manager;

pub use manager::{AgentManager, RegistryError, RegistryResult};
