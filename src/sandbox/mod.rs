//! Sandboxed command execution for Conclave agents.
//!
//! Every shell command an agent runs is checked against that agent's
//! allow-list and then executed inside a freshly created, single-use
//! container that only sees the agent's allow-listed host paths, mounted
//! read-only. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
