//! Port contracts for agent collaborators.

mod completion;

#[cfg(test)]
pub use completion::MockCompletionProvider;
pub use completion::{
    Completion, CompletionError, CompletionProvider, CompletionRequest, CompletionResult,
};
