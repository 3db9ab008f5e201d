//! Capabilities an agent exposes to the language model, and parsing of the
//! invocations the model sends back.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Name of the sandboxed shell command capability.
pub const RUN_COMMAND: &str = "run_command";

/// Name of the topic publish capability.
pub const PUBLISH_MESSAGE: &str = "send_agent_message";

/// A capability declared to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDeclaration {
    name: String,
    description: String,
    input_schema: Value,
}

impl CapabilityDeclaration {
    /// Creates a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Returns the declarations every agent offers: running a command and
    /// publishing to a topic.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new(
                RUN_COMMAND,
                "Run a shell command inside this agent's sandbox and return its output",
                json!({
                    "type": "object",
                    "properties": {
                        "command": {"type": "string", "description": "Command line to run"}
                    },
                    "required": ["command"]
                }),
            ),
            Self::new(
                PUBLISH_MESSAGE,
                "Publish a message to a topic other agents can subscribe to",
                json!({
                    "type": "object",
                    "properties": {
                        "topic": {"type": "string"},
                        "content": {"type": "string"}
                    },
                    "required": ["topic", "content"]
                }),
            ),
        ]
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the capability description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the JSON schema of the arguments.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }
}

/// A raw capability invocation as returned by the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityInvocation {
    call_id: String,
    name: String,
    arguments: Value,
}

impl CapabilityInvocation {
    /// Creates an invocation.
    #[must_use]
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Returns the provider-assigned call id.
    #[must_use]
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Returns the requested capability name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw arguments.
    #[must_use]
    pub const fn arguments(&self) -> &Value {
        &self.arguments
    }
}

/// Errors raised while turning a raw invocation into a [`Capability`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityParseError {
    /// The provider asked for a capability the agent does not offer.
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),

    /// The arguments do not match the capability's schema.
    #[error("malformed arguments for '{name}': {reason}")]
    MalformedArguments {
        /// The capability name.
        name: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// A validated capability request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Run a command in the agent's sandbox.
    RunCommand {
        /// Raw command line.
        command: String,
    },
    /// Publish a message to a topic.
    Publish {
        /// Destination topic.
        topic: String,
        /// Message payload.
        content: String,
    },
}

#[derive(Deserialize)]
struct RunCommandArgs {
    command: String,
}

#[derive(Deserialize)]
struct PublishArgs {
    topic: String,
    content: String,
}

/// Providers deliver arguments either as a JSON object or as a string that
/// encodes one.
fn decode<T: serde::de::DeserializeOwned>(
    invocation: &CapabilityInvocation,
) -> Result<T, CapabilityParseError> {
    let malformed = |err: serde_json::Error| CapabilityParseError::MalformedArguments {
        name: invocation.name.clone(),
        reason: err.to_string(),
    };
    match &invocation.arguments {
        Value::String(encoded) => serde_json::from_str(encoded).map_err(malformed),
        other => T::deserialize(other).map_err(malformed),
    }
}

impl TryFrom<&CapabilityInvocation> for Capability {
    type Error = CapabilityParseError;

    fn try_from(invocation: &CapabilityInvocation) -> Result<Self, Self::Error> {
        match invocation.name() {
            RUN_COMMAND => {
                let args: RunCommandArgs = decode(invocation)?;
                Ok(Self::RunCommand {
                    command: args.command,
                })
            }
            PUBLISH_MESSAGE => {
                let args: PublishArgs = decode(invocation)?;
                Ok(Self::Publish {
                    topic: args.topic,
                    content: args.content,
                })
            }
            other => Err(CapabilityParseError::UnknownCapability(other.to_owned())),
        }
    }
}
