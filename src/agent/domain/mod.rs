//! Domain model for agents.
//!
//! Identity, profile, conversation turns, capability invocations and the
//! processing state machine. Infrastructure concerns remain outside this
//! boundary.

mod activity;
mod capability;
mod error;
mod ids;
mod profile;
mod state;
mod turn;

pub use activity::ActivityStamp;
pub use capability::{
    Capability, CapabilityDeclaration, CapabilityInvocation, CapabilityParseError,
    PUBLISH_MESSAGE, RUN_COMMAND,
};
pub use error::AgentDomainError;
pub use ids::AgentId;
pub use profile::AgentProfile;
pub use state::AgentState;
pub use turn::{ConversationHistory, Turn, TurnRole};
