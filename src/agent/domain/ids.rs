//! Caller-supplied agent identifier.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, caller-supplied identifier of a running agent.
///
/// # Examples
///
/// ```
/// use conclave::agent::domain::AgentId;
///
/// let id = AgentId::new("  reviewer-1 ").expect("valid id");
/// assert_eq!(id.as_str(), "reviewer-1");
/// assert!(AgentId::new("two words").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Creates a validated agent identifier.
    ///
    /// The input is trimmed. Interior whitespace and control characters are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(AgentDomainError::EmptyAgentId);
        }
        if normalized
            .chars()
            .any(|character| character.is_whitespace() || character.is_control())
        {
            return Err(AgentDomainError::InvalidAgentId(normalized));
        }
        Ok(Self(normalized))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AgentId {
    type Error = AgentDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentId> for String {
    fn from(value: AgentId) -> Self {
        value.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
