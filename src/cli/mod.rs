//! Operator commands. Each opens the configured database directly and prints to
//! stdout; the MCP server does not need to be running.

pub mod doctor;
pub mod export;
pub mod import;
pub mod inspect;
pub mod reset;
pub mod stats;
