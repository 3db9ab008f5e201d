//! Adapter implementations of the agent ports.

mod memory;

pub use memory::ScriptedCompletionProvider;
