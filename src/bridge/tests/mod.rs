//! Unit tests for the bridge surface.
