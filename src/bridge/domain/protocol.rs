//! Tagged JSON requests and responses.

use super::split_comma_list;
use crate::registry::domain::{AgentSummary, CreateAgentRequest};
use serde::{Deserialize, Serialize};

/// Tool inputs for creating an agent.
///
/// `paths` and `allowed_commands` are comma-separated lists; either may be
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAgentParams {
    /// Caller-chosen agent id.
    pub id: String,
    /// System prompt.
    #[serde(default)]
    pub system_prompt: String,
    /// Task description.
    #[serde(default)]
    pub task: String,
    /// Host paths mounted read-only, comma-separated.
    #[serde(default)]
    pub paths: String,
    /// Executable names the agent may run, comma-separated.
    #[serde(default)]
    pub allowed_commands: String,
}

impl From<CreateAgentParams> for CreateAgentRequest {
    fn from(params: CreateAgentParams) -> Self {
        Self::new(params.id, params.system_prompt, params.task)
            .with_allowed_commands(split_comma_list(&params.allowed_commands))
            .with_allowed_paths(split_comma_list(&params.paths))
    }
}

/// A bridge operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum BridgeRequest {
    /// Start an agent.
    CreateAgent(CreateAgentParams),
    /// List live agents.
    ListAgents,
    /// Send a command and wait for the reply.
    SendCommand {
        /// Target agent.
        agent_id: String,
        /// Command text.
        command: String,
    },
    /// Subscribe an agent to a topic.
    SubscribeAgent {
        /// Subscribing agent.
        agent_id: String,
        /// Topic name.
        topic: String,
    },
    /// Stop an agent.
    KillAgent {
        /// Target agent.
        agent_id: String,
    },
}

/// Outcome of a bridge operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeResponse {
    /// An agent was created.
    AgentCreated {
        /// The new agent.
        agent: AgentSummary,
    },
    /// Live agents.
    Agents {
        /// One entry per agent.
        agents: Vec<AgentSummary>,
    },
    /// An agent's reply to a command.
    CommandResult {
        /// Reply text.
        response: String,
    },
    /// Acknowledgement of a subscribe or kill.
    Ack {
        /// Human-readable acknowledgement.
        message: String,
    },
    /// The operation failed.
    Error {
        /// Error description.
        message: String,
    },
}
