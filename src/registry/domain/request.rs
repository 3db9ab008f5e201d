//! Input for creating an agent.

use crate::agent::domain::AgentProfile;
use crate::sandbox::domain::{AllowedCommands, AllowedPaths, SandboxPolicy};

/// Everything needed to start an agent.
///
/// The id is validated when the request reaches the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAgentRequest {
    id: String,
    system_prompt: String,
    task: String,
    allowed_commands: Vec<String>,
    allowed_paths: Vec<String>,
}

impl CreateAgentRequest {
    /// Creates a request with empty allow-lists.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        system_prompt: impl Into<String>,
        task: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            system_prompt: system_prompt.into(),
            task: task.into(),
            allowed_commands: Vec::new(),
            allowed_paths: Vec::new(),
        }
    }

    /// Sets the executables the agent may run.
    #[must_use]
    pub fn with_allowed_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the host paths mounted read-only into the agent's sandbox.
    #[must_use]
    pub fn with_allowed_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the requested agent id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Builds the agent profile described by this request.
    #[must_use]
    pub fn profile(&self) -> AgentProfile {
        let policy = SandboxPolicy::new(
            AllowedCommands::new(&self.allowed_commands),
            AllowedPaths::new(&self.allowed_paths),
        );
        AgentProfile::new(&self.system_prompt, &self.task, policy)
    }
}
