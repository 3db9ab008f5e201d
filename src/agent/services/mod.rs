//! Service layer for agents: the conversation session and the task loop
//! that serves it.

mod session;
mod worker;

pub use session::{AgentCollaborators, AgentSession, AgentTurnError, AgentTurnResult};
pub use worker::{AgentCommand, AgentExit, AgentSignals, AgentWorker};
