//! Local implementations: an HTTP adapter for the engine service and the
//! environment/credential loader.

pub mod config;
pub mod engine;

pub use config::{load_env, EnvReport, EnvSource};
pub use engine::HttpEngine;
