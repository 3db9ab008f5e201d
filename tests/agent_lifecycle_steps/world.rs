//! Shared world state for agent lifecycle BDD scenarios.

use std::sync::Arc;

use conclave::{
    agent::{adapters::ScriptedCompletionProvider, services::AgentCollaborators},
    bridge::{
        domain::CreateAgentParams,
        services::{BridgeResult, BridgeService},
    },
    bus::services::MessageBus,
    config::ConclaveConfig,
    registry::{domain::AgentSummary, services::AgentManager},
    sandbox::{adapters::InMemorySandboxRuntime, services::CommandExecutor},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Scenario world for agent lifecycle behaviour tests.
pub struct LifecycleWorld {
    /// Scripted model shared by every agent.
    pub provider: Arc<ScriptedCompletionProvider>,
    /// Shared message bus.
    pub bus: Arc<MessageBus>,
    /// The bridge under test.
    pub bridge: BridgeService,
    /// Result of the last create attempt.
    pub last_create: Option<BridgeResult<AgentSummary>>,
    /// Result of the last command sent.
    pub last_reply: Option<BridgeResult<String>>,
}

impl LifecycleWorld {
    /// Creates a world backed by in-memory collaborators.
    #[must_use]
    pub fn new() -> Self {
        let config = ConclaveConfig::default();
        let provider = Arc::new(ScriptedCompletionProvider::new());
        let bus = Arc::new(MessageBus::with_limits(config.bus_limits()));
        let collaborators = AgentCollaborators::new(
            provider.clone(),
            Arc::new(CommandExecutor::new(
                Arc::new(InMemorySandboxRuntime::new()),
                &config.sandbox.image,
            )),
            Arc::clone(&bus),
        );
        let manager = AgentManager::new(
            collaborators,
            Arc::new(DefaultClock),
            config.registry_limits(),
        );
        Self {
            provider,
            bus,
            bridge: BridgeService::new(manager),
            last_create: None,
            last_reply: None,
        }
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds create parameters for an agent with no mounted paths.
pub fn create_params(id: &str, commands: &str) -> CreateAgentParams {
    CreateAgentParams {
        id: id.to_owned(),
        system_prompt: "You are a shell operator.".to_owned(),
        task: "Follow instructions".to_owned(),
        paths: String::new(),
        allowed_commands: commands.to_owned(),
    }
}
