//! Bridge operations over a running [`AgentManager`].

use crate::agent::{
    domain::AgentId,
    ports::CompletionProvider,
    services::AgentCollaborators,
};
use crate::bridge::domain::{BridgeRequest, BridgeResponse, CreateAgentParams};
use crate::bus::services::MessageBus;
use crate::config::ConclaveConfig;
use crate::registry::{
    domain::AgentSummary,
    services::{AgentManager, RegistryError},
};
use crate::sandbox::{
    adapters::DockerCliRuntime, ports::SandboxRuntime, services::CommandExecutor,
};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors returned by bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The registry rejected the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A JSON response could not be encoded.
    #[error("failed to encode bridge response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

fn parse_id(raw: &str) -> BridgeResult<AgentId> {
    AgentId::new(raw).map_err(|err| BridgeError::Registry(RegistryError::from(err)))
}

/// Entry point for a controlling client.
pub struct BridgeService<C = DefaultClock>
where
    C: Clock + Send + Sync + 'static,
{
    manager: AgentManager<C>,
}

impl BridgeService<DefaultClock> {
    /// Wires a bus, executor and registry from `config` and starts the idle
    /// reaper.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(
        config: &ConclaveConfig,
        provider: Arc<dyn CompletionProvider>,
        runtime: Arc<dyn SandboxRuntime>,
    ) -> Self {
        let bus = Arc::new(MessageBus::with_limits(config.bus_limits()));
        let executor = Arc::new(CommandExecutor::new(runtime, &config.sandbox.image));
        let collaborators = AgentCollaborators::new(provider, executor, bus);
        let manager = AgentManager::new(
            collaborators,
            Arc::new(DefaultClock),
            config.registry_limits(),
        );
        manager.start_idle_reaper();
        info!(
            image = %config.sandbox.image,
            idle_threshold_secs = config.registry.idle_threshold_secs,
            "bridge started"
        );
        Self::new(manager)
    }

    /// Like [`Self::start`], running sandboxes through the configured
    /// container CLI.
    #[must_use]
    pub fn start_with_container_cli(
        config: &ConclaveConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        let runtime = Arc::new(DockerCliRuntime::new(&config.sandbox.runtime_binary));
        Self::start(config, provider, runtime)
    }
}

impl<C> BridgeService<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Wraps an existing manager.
    #[must_use]
    pub const fn new(manager: AgentManager<C>) -> Self {
        Self { manager }
    }

    /// Returns the underlying manager.
    #[must_use]
    pub const fn manager(&self) -> &AgentManager<C> {
        &self.manager
    }

    /// Creates an agent from tool inputs.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Registry`] when the id is invalid or taken.
    pub async fn create_agent(&self, params: CreateAgentParams) -> BridgeResult<AgentSummary> {
        Ok(self.manager.create(params.into()).await?)
    }

    /// Lists live agents.
    pub async fn list_agents(&self) -> Vec<AgentSummary> {
        self.manager.list().await
    }

    /// Sends `command` to an agent and returns its reply.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Registry`] when the agent is unknown, stops
    /// before answering, or its completion fails.
    pub async fn send_command(&self, agent_id: &str, command: &str) -> BridgeResult<String> {
        let id = parse_id(agent_id)?;
        Ok(self.manager.send_command(&id, command).await?)
    }

    /// Subscribes an agent to a topic and returns an acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Registry`] when the id is invalid.
    pub async fn subscribe_agent(&self, agent_id: &str, topic: &str) -> BridgeResult<String> {
        let id = parse_id(agent_id)?;
        self.manager.subscribe(&id, topic).await;
        Ok(format!("agent '{id}' subscribed to topic '{topic}'"))
    }

    /// Stops an agent and returns an acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Registry`] when the agent is unknown.
    pub async fn kill_agent(&self, agent_id: &str) -> BridgeResult<String> {
        let id = parse_id(agent_id)?;
        self.manager.kill(&id).await?;
        Ok(format!("agent '{id}' terminated"))
    }

    /// Runs one request. Failures become [`BridgeResponse::Error`].
    pub async fn dispatch(&self, request: BridgeRequest) -> BridgeResponse {
        let outcome = match request {
            BridgeRequest::CreateAgent(params) => self
                .create_agent(params)
                .await
                .map(|agent| BridgeResponse::AgentCreated { agent }),
            BridgeRequest::ListAgents => Ok(BridgeResponse::Agents {
                agents: self.list_agents().await,
            }),
            BridgeRequest::SendCommand { agent_id, command } => self
                .send_command(&agent_id, &command)
                .await
                .map(|response| BridgeResponse::CommandResult { response }),
            BridgeRequest::SubscribeAgent { agent_id, topic } => self
                .subscribe_agent(&agent_id, &topic)
                .await
                .map(|message| BridgeResponse::Ack { message }),
            BridgeRequest::KillAgent { agent_id } => self
                .kill_agent(&agent_id)
                .await
                .map(|message| BridgeResponse::Ack { message }),
        };
        outcome.unwrap_or_else(|err| BridgeResponse::Error {
            message: err.to_string(),
        })
    }

    /// Decodes a JSON request, runs it and encodes the response.
    ///
    /// Malformed requests produce an error response rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Encode`] when the response cannot be encoded.
    pub async fn handle_json(&self, raw: &str) -> BridgeResult<String> {
        let response = match serde_json::from_str::<BridgeRequest>(raw) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => BridgeResponse::Error {
                message: format!("invalid request: {err}"),
            },
        };
        Ok(serde_json::to_string(&response)?)
    }

    /// Stops every agent and the reaper.
    pub async fn shutdown(&self) {
        self.manager.shutdown().await;
    }
}
