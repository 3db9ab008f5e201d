//! Static configuration of an agent.

use crate::sandbox::domain::SandboxPolicy;
use serde::{Deserialize, Serialize};

/// What an agent is told and what it may touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    system_prompt: String,
    task: String,
    policy: SandboxPolicy,
}

impl AgentProfile {
    /// Creates a profile.
    #[must_use]
    pub fn new(
        system_prompt: impl Into<String>,
        task: impl Into<String>,
        policy: SandboxPolicy,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            task: task.into(),
            policy,
        }
    }

    /// Returns the system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Returns the task description.
    #[must_use]
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns the sandbox policy.
    #[must_use]
    pub const fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    /// Builds the opening system turn: the system prompt followed by the
    /// task, either of which may be blank.
    #[must_use]
    pub fn opening_instructions(&self) -> String {
        let prompt = self.system_prompt.trim();
        let task = self.task.trim();
        match (prompt.is_empty(), task.is_empty()) {
            (false, false) => format!("{prompt}\n\nTask: {task}"),
            (false, true) => prompt.to_owned(),
            (true, false) => format!("Task: {task}"),
            (true, true) => String::new(),
        }
    }
}
