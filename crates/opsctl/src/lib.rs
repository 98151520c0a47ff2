//! Opsctl library - exposes modules for integration tests.

pub mod commands;
pub mod errors;
