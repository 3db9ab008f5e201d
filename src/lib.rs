//! Conclave: orchestration bridge for long-running AI agents.
//!
//! A controlling client asks the bridge to start agents. Each agent holds its
//! own conversation with a language model, runs shell commands in single-use
//! containers restricted to an allow-list, and coordinates with other agents
//! through named topics on a shared message bus.
//!
//! # Architecture
//!
//! Conclave follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and invariants with no infrastructure dependencies
//! - **Ports**: Trait interfaces for the language model and container runtime
//! - **Adapters**: Concrete implementations of ports (container CLI, in-memory
//!   doubles)
//! - **Services**: Orchestration over domain types and ports
//!
//! # Modules
//!
//! - [`sandbox`]: Allow-listed command execution in ephemeral containers
//! - [`bus`]: Topic-addressed publish/subscribe between agents
//! - [`agent`]: Conversation sessions and the per-agent task loop
//! - [`registry`]: Agent lifecycle management and idle reaping
//! - [`bridge`]: Tool-facing operations and JSON dispatch
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Structured logging setup

pub mod agent;
pub mod bridge;
pub mod bus;
pub mod config;
pub mod registry;
pub mod sandbox;
pub mod telemetry;
