//! Agent registry: creates, tracks, commands and terminates running agents.
//!
//! Each agent runs as its own task, reachable only through a single-slot
//! inbox and stop signals held by [`services::AgentManager`]. An optional
//! background reaper removes agents that stay idle past a threshold.
//!
//! - Request and summary types in [`domain`]
//! - The manager and its error type in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
