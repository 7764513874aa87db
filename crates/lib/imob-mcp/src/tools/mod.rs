//! MCP tool modules.
//!
//! Tools are grouped by backend entity. Every tool answers with plain text:
//! backend failures are turned into messages here and never surface as
//! protocol errors.

pub mod contacts;
pub mod properties;
pub mod tasks;
