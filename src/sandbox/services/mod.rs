//! Service layer for sandboxed command execution.

mod executor;

pub use executor::{
    CommandExecutionError, CommandExecutionResult, CommandExecutor, CommandOutput,
};
