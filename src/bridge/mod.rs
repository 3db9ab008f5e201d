//! Tool-facing surface over the agent registry.
//!
//! [`services::BridgeService`] exposes the operations a controlling client
//! calls: create, list, command, subscribe and kill. Comma-separated inputs
//! are parsed here, and [`domain::BridgeRequest`] offers the same operations
//! as tagged JSON.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
