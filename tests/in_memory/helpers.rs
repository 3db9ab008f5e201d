//! Shared test helpers for in-memory integration tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, Utc};
use conclave::{
    agent::{
        adapters::ScriptedCompletionProvider,
        domain::{AgentId, CapabilityInvocation, PUBLISH_MESSAGE, RUN_COMMAND},
        services::AgentCollaborators,
    },
    bus::services::MessageBus,
    registry::{
        domain::{CreateAgentRequest, RegistryLimits},
        services::AgentManager,
    },
    sandbox::{adapters::InMemorySandboxRuntime, services::CommandExecutor},
};
use mockable::Clock;
use rstest::fixture;
use serde_json::json;

/// Clock that only moves when a test advances it.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    /// Creates a clock at the current millisecond.
    ///
    /// # Panics
    ///
    /// Panics if the current time cannot be represented.
    #[must_use]
    pub fn new() -> Self {
        let start = DateTime::from_timestamp_millis(Utc::now().timestamp_millis())
            .expect("current time is representable");
        Self(Mutex::new(start))
    }

    /// Moves the clock forward.
    ///
    /// # Panics
    ///
    /// Panics if the clock lock is poisoned.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.0.lock().expect("clock lock");
        *now += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// Every collaborator of a running registry, exposed for assertions.
pub struct Stack {
    /// Scripted language model shared by all agents.
    pub provider: Arc<ScriptedCompletionProvider>,
    /// Simulated container runtime.
    pub runtime: Arc<InMemorySandboxRuntime>,
    /// Shared message bus.
    pub bus: Arc<MessageBus>,
    /// Manually driven clock.
    pub clock: Arc<ManualClock>,
    /// The registry under test.
    pub manager: AgentManager<ManualClock>,
}

/// Provides a registry wired to in-memory collaborators.
#[fixture]
pub fn stack() -> Stack {
    let provider = Arc::new(ScriptedCompletionProvider::new());
    let runtime = Arc::new(InMemorySandboxRuntime::new());
    let bus = Arc::new(MessageBus::new());
    let clock = Arc::new(ManualClock::new());
    let collaborators = AgentCollaborators::new(
        provider.clone(),
        Arc::new(CommandExecutor::new(runtime.clone(), "alpine:3.20")),
        Arc::clone(&bus),
    );
    let manager = AgentManager::new(collaborators, Arc::clone(&clock), RegistryLimits::default());
    Stack {
        provider,
        runtime,
        bus,
        clock,
        manager,
    }
}

/// Parses an agent id.
///
/// # Panics
///
/// Panics if the id is invalid.
#[must_use]
pub fn agent(id: &str) -> AgentId {
    AgentId::new(id).expect("valid agent id")
}

/// Builds a create request allowing only `echo` and no paths.
#[must_use]
pub fn echo_agent(id: &str) -> CreateAgentRequest {
    CreateAgentRequest::new(id, "You are a shell operator.", "Run what you are told")
        .with_allowed_commands(["echo"])
}

/// Builds a `run_command` invocation.
#[must_use]
pub fn run_command(call_id: &str, command: &str) -> CapabilityInvocation {
    CapabilityInvocation::new(call_id, RUN_COMMAND, json!({ "command": command }))
}

/// Builds a publish invocation.
#[must_use]
pub fn publish(call_id: &str, topic: &str, content: &str) -> CapabilityInvocation {
    CapabilityInvocation::new(
        call_id,
        PUBLISH_MESSAGE,
        json!({ "topic": topic, "content": content }),
    )
}
