//! Agents: conversation sessions with a completion provider.
//!
//! An agent owns its system prompt, task, sandbox policy and conversation
//! history. Each command it receives drives one or more completion turns that
//! may run sandboxed commands or publish messages on the bus. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The conversation session and processing loop in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
