//! Immutable inter-agent message.

use crate::agent::domain::AgentId;
use serde::{Deserialize, Serialize};

/// A message published by an agent to a topic.
///
/// Messages are created only when an agent invokes its publish capability and
/// are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusMessage {
    from: AgentId,
    topic: String,
    content: String,
}

impl BusMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(from: AgentId, topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            from,
            topic: topic.into(),
            content: content.into(),
        }
    }

    /// Returns the publishing agent.
    #[must_use]
    pub const fn from(&self) -> &AgentId {
        &self.from
    }

    /// Returns the destination topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the opaque payload.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}
