//! Process wiring: configuration, tracing and the engine that owns every actor.

pub mod config;
pub mod engine;
pub mod tracing;

pub use config::EngineConfig;
pub use engine::*;
pub use self::tracing::setup_tracing;
