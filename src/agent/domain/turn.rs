//! Conversation turns and the append-only history an agent keeps.

use super::CapabilityInvocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Instructions or injected context.
    System,
    /// A command from the controlling client.
    User,
    /// A completion produced by the language model.
    Assistant,
    /// The outcome of a capability invocation.
    ToolResult,
}

impl TurnRole {
    /// Returns the canonical role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::ToolResult => "tool_result",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One role-tagged entry in a conversation.
///
/// Assistant turns may carry the capability invocations the model requested;
/// tool-result turns carry the call id they answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: TurnRole,
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    invocations: Vec<CapabilityInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    call_id: Option<String>,
}

impl Turn {
    fn plain(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            invocations: Vec::new(),
            call_id: None,
        }
    }

    /// Creates a system turn.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(TurnRole::System, content)
    }

    /// Creates a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(TurnRole::User, content)
    }

    /// Creates an assistant turn with no invocations.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(TurnRole::Assistant, content)
    }

    /// Creates an assistant turn that requested capability invocations.
    #[must_use]
    pub fn assistant_with_invocations(
        content: impl Into<String>,
        invocations: Vec<CapabilityInvocation>,
    ) -> Self {
        Self {
            invocations,
            ..Self::plain(TurnRole::Assistant, content)
        }
    }

    /// Creates a tool-result turn answering `call_id`.
    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: Some(call_id.into()),
            ..Self::plain(TurnRole::ToolResult, content)
        }
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> TurnRole {
        self.role
    }

    /// Returns the text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the invocations requested by an assistant turn.
    #[must_use]
    pub fn invocations(&self) -> &[CapabilityInvocation] {
        &self.invocations
    }

    /// Returns the call id a tool-result turn answers.
    #[must_use]
    pub fn call_id(&self) -> Option<&str> {
        self.call_id.as_deref()
    }
}

/// Ordered, append-only conversation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<Turn>);

impl ConversationHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a turn.
    pub fn push(&mut self, turn: Turn) {
        self.0.push(turn);
    }

    /// Returns every turn in order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    /// Returns the number of turns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no turn has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the most recent turn.
    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }
}
