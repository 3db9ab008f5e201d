//! Registry request, summary and limit types.

mod limits;
mod request;
mod summary;

pub use limits::{DEFAULT_IDLE_THRESHOLD, DEFAULT_REAPER_INTERVAL, RegistryLimits};
pub use request::CreateAgentRequest;
pub use summary::AgentSummary;
