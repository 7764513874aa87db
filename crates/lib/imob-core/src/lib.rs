//! Core types and helpers for imob-mcp.
//!
//! This crate owns the client for the internal backend REST interface, the
//! field normalizer that tolerates both `camelCase` and `snake_case` records,
//! and the presenters that turn backend records into user-facing text.

pub mod backend;
pub mod fields;
pub mod format;
pub mod present;
