//! Per-agent sandbox policy: which executables may run and which host paths
//! are visible.

use super::{CommandLine, ReadOnlyMount, SandboxDomainError};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of executable names an agent may invoke.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedCommands(BTreeSet<String>);

impl AllowedCommands {
    /// Builds an allow-list from executable names.
    ///
    /// Names are trimmed; blank entries are dropped.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(|name| name.into().trim().to_owned())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    /// Returns `true` when `program` exactly matches an allow-listed name.
    #[must_use]
    pub fn permits(&self, program: &str) -> bool {
        self.0.contains(program)
    }

    /// Returns `true` when nothing is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the allowed names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Host paths exposed read-only inside an agent's sandbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedPaths(Vec<Utf8PathBuf>);

impl AllowedPaths {
    /// Builds the path list, dropping blank entries and duplicates while
    /// preserving first-seen order.
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<Utf8PathBuf> = Vec::new();
        for raw in paths {
            let trimmed = raw.into().trim().to_owned();
            if trimmed.is_empty() {
                continue;
            }
            let path = Utf8PathBuf::from(trimmed);
            if !collected.contains(&path) {
                collected.push(path);
            }
        }
        Self(collected)
    }

    /// Returns the configured host paths.
    #[must_use]
    pub fn as_slice(&self) -> &[Utf8PathBuf] {
        &self.0
    }

    /// Translates every path into a read-only bind mount at the same
    /// location inside the container.
    #[must_use]
    pub fn mounts(&self) -> Vec<ReadOnlyMount> {
        self.0.iter().cloned().map(ReadOnlyMount::mirrored).collect()
    }
}

/// The complete sandbox policy attached to one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxPolicy {
    commands: AllowedCommands,
    paths: AllowedPaths,
}

impl SandboxPolicy {
    /// Creates a policy from its allow-lists.
    #[must_use]
    pub const fn new(commands: AllowedCommands, paths: AllowedPaths) -> Self {
        Self { commands, paths }
    }

    /// Returns the executable allow-list.
    #[must_use]
    pub const fn commands(&self) -> &AllowedCommands {
        &self.commands
    }

    /// Returns the host path allow-list.
    #[must_use]
    pub const fn paths(&self) -> &AllowedPaths {
        &self.paths
    }

    /// Parses `raw` and checks its executable against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxDomainError::EmptyCommand`] for blank input and
    /// [`SandboxDomainError::CommandNotAllowed`] when the first token is not
    /// allow-listed.
    pub fn authorise(&self, raw: &str) -> Result<CommandLine, SandboxDomainError> {
        let line = CommandLine::parse(raw)?;
        if !self.commands.permits(line.program()) {
            return Err(SandboxDomainError::CommandNotAllowed {
                command: line.program().to_owned(),
            });
        }
        Ok(line)
    }
}
