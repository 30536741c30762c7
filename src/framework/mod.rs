//! Generic actor framework for resource management.
//!
//! This module provides the building blocks for the collaborator actors that manage
//! resource entities with CRUD operations and custom actions.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that manages entities
//! - [`ResourceClient`] - Type-safe client for talking to a `ResourceActor`
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test actors without spawning their collaborators.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
