//! Unit tests for the agent registry.
