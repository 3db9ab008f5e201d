//! Listing entry for a running agent.

use crate::agent::domain::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity and last activity of a running agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    id: AgentId,
    last_active: DateTime<Utc>,
}

impl AgentSummary {
    /// Creates a summary.
    #[must_use]
    pub const fn new(id: AgentId, last_active: DateTime<Utc>) -> Self {
        Self { id, last_active }
    }

    /// Returns the agent id.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns when the agent last received a command.
    #[must_use]
    pub const fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }
}
