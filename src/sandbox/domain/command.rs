//! Tokenised command line value object.

use super::SandboxDomainError;
use std::fmt;

/// A command line split into whitespace-separated tokens.
///
/// No quoting or expansion is performed. The tokens become the container's
/// argument vector directly and never pass through a shell.
///
/// # Examples
///
/// ```
/// use conclave::sandbox::domain::CommandLine;
///
/// let line = CommandLine::parse("echo hello world").expect("non-empty command");
/// assert_eq!(line.program(), "echo");
/// assert_eq!(line.argv().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    argv: Vec<String>,
}

impl CommandLine {
    /// Parses a raw command line.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxDomainError::EmptyCommand`] when the input contains
    /// only whitespace.
    pub fn parse(raw: &str) -> Result<Self, SandboxDomainError> {
        let argv: Vec<String> = raw.split_whitespace().map(ToOwned::to_owned).collect();
        let program = argv
            .first()
            .cloned()
            .ok_or(SandboxDomainError::EmptyCommand)?;
        Ok(Self { program, argv })
    }

    /// Returns the executable name (first token).
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns every token, program first.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Consumes the command line and returns its tokens.
    #[must_use]
    pub fn into_argv(self) -> Vec<String> {
        self.argv
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.argv.join(" "))
    }
}
