//! One agent's conversation with its completion provider.

use crate::agent::{
    domain::{
        AgentId, AgentProfile, AgentState, Capability, CapabilityDeclaration,
        CapabilityInvocation, ConversationHistory, Turn,
    },
    ports::{Completion, CompletionError, CompletionProvider, CompletionRequest},
};
use crate::bus::{domain::BusMessage, services::MessageBus};
use crate::sandbox::services::CommandExecutor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that abort a single command without stopping the agent.
#[derive(Debug, Clone, Error)]
pub enum AgentTurnError {
    /// A completion request failed; the failed call is not recorded.
    #[error("completion failed: {0}")]
    CompletionFailure(#[source] CompletionError),
}

/// Result type for agent turns.
pub type AgentTurnResult<T> = Result<T, AgentTurnError>;

/// Shared services every agent talks to.
#[derive(Clone)]
pub struct AgentCollaborators {
    provider: Arc<dyn CompletionProvider>,
    executor: Arc<CommandExecutor>,
    bus: Arc<MessageBus>,
}

impl AgentCollaborators {
    /// Bundles the collaborators.
    #[must_use]
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        executor: Arc<CommandExecutor>,
        bus: Arc<MessageBus>,
    ) -> Self {
        Self {
            provider,
            executor,
            bus,
        }
    }

    /// Returns the message bus.
    #[must_use]
    pub const fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Returns the command executor.
    #[must_use]
    pub const fn executor(&self) -> &Arc<CommandExecutor> {
        &self.executor
    }
}

/// Conversation state and turn logic for one agent.
///
/// A session is owned by exactly one task; nothing else mutates it.
pub struct AgentSession {
    id: AgentId,
    profile: AgentProfile,
    history: ConversationHistory,
    state: AgentState,
    capabilities: Vec<CapabilityDeclaration>,
    collaborators: AgentCollaborators,
}

impl AgentSession {
    /// Creates a session whose history opens with the profile's
    /// instructions.
    #[must_use]
    pub fn new(id: AgentId, profile: AgentProfile, collaborators: AgentCollaborators) -> Self {
        let mut history = ConversationHistory::new();
        let opening = profile.opening_instructions();
        if !opening.is_empty() {
            history.push(Turn::system(opening));
        }
        Self {
            id,
            profile,
            history,
            state: AgentState::Idle,
            capabilities: CapabilityDeclaration::builtin(),
            collaborators,
        }
    }

    /// Returns the agent id.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the agent profile.
    #[must_use]
    pub const fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Returns the conversation so far.
    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Returns the current processing state.
    #[must_use]
    pub const fn state(&self) -> AgentState {
        self.state
    }

    /// Marks the session as stopped.
    pub fn terminate(&mut self) {
        self.transition(AgentState::Terminated);
    }

    fn transition(&mut self, next: AgentState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            warn!(agent_id = %self.id, from = %self.state, to = %next, "unexpected agent transition");
        }
        debug!(agent_id = %self.id, from = %self.state, to = %next, "agent state changed");
        self.state = next;
    }

    /// Processes one command and returns the text to hand back.
    ///
    /// The first completion may request capability invocations, which are
    /// dispatched in order before a single follow-up completion. Messages
    /// waiting on the bus are then folded in with one more completion.
    ///
    /// # Errors
    ///
    /// Returns [`AgentTurnError::CompletionFailure`] when any completion
    /// call fails. Turns recorded before the failure are kept.
    pub async fn handle_command(&mut self, text: &str) -> AgentTurnResult<String> {
        self.transition(AgentState::AwaitingCompletion);
        self.history.push(Turn::user(text));
        let outcome = self.run_turns().await;
        self.transition(AgentState::Idle);
        outcome
    }

    async fn run_turns(&mut self) -> AgentTurnResult<String> {
        let first = self.complete().await?;
        let mut response = if first.has_invocations() {
            let (text, invocations) = first.into_parts();
            self.history
                .push(Turn::assistant_with_invocations(text, invocations.clone()));
            self.transition(AgentState::DispatchingTools);
            for invocation in &invocations {
                let result = self.dispatch(invocation).await;
                self.history
                    .push(Turn::tool_result(invocation.call_id(), result));
            }
            self.transition(AgentState::AwaitingFinalCompletion);
            let follow_up = self.complete().await?;
            self.record_final(follow_up)
        } else {
            self.record_final(first)
        };

        let inbound = self.collaborators.bus.drain(&self.id).await;
        if !inbound.is_empty() {
            self.history.push(Turn::system(render_inbound(&inbound)));
            self.transition(AgentState::AwaitingFinalCompletion);
            let digest = self.complete().await?;
            response = self.record_final(digest);
        }
        Ok(response)
    }

    async fn complete(&self) -> AgentTurnResult<Completion> {
        let request =
            CompletionRequest::new(self.history.turns().to_vec(), self.capabilities.clone());
        self.collaborators
            .provider
            .complete(&request)
            .await
            .map_err(AgentTurnError::CompletionFailure)
    }

    /// Records a completion that ends a turn. Invocations it carries are not
    /// dispatched.
    fn record_final(&mut self, completion: Completion) -> String {
        if completion.has_invocations() {
            debug!(
                agent_id = %self.id,
                ignored = completion.invocations().len(),
                "follow-up completion requested invocations; ignoring"
            );
        }
        let (text, _) = completion.into_parts();
        self.history.push(Turn::assistant(text.clone()));
        text
    }

    async fn dispatch(&self, invocation: &CapabilityInvocation) -> String {
        let capability = match Capability::try_from(invocation) {
            Ok(capability) => capability,
            Err(err) => return format!("error: {err}"),
        };
        match capability {
            Capability::RunCommand { command } => {
                debug!(agent_id = %self.id, command = %command, "running sandboxed command");
                self.collaborators
                    .executor
                    .execute(&command, self.profile.policy())
                    .await
                    .map_or_else(|err| format!("error: {err}"), |output| output.render())
            }
            Capability::Publish { topic, content } => {
                let message = BusMessage::new(self.id.clone(), topic.clone(), content);
                self.collaborators.bus.publish(message).await.map_or_else(
                    |err| format!("error: {err}"),
                    |()| format!("message published to topic '{topic}'"),
                )
            }
        }
    }
}

fn render_inbound(messages: &[BusMessage]) -> String {
    let lines: Vec<String> = messages
        .iter()
        .map(|message| {
            format!(
                "[{}] {}: {}",
                message.topic(),
                message.from(),
                message.content()
            )
        })
        .collect();
    format!("Messages received from other agents:\n{}", lines.join("\n"))
}
