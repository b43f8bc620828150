//! `deep-search` crate (library surface).
//!
//! The primary entrypoint for end users is the `deep-search` binary (CLI + MCP stdio).
//! This library exposes the process-level pieces the binary is assembled from, plus
//! the core types, so they can be embedded or tested without spawning a process.

pub use deep_search_core as core;

pub mod lifecycle;
pub mod logging;
