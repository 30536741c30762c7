//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing-subscriber` fmt subscriber used by the binary.
//! Filtering comes from `RUST_LOG` when it is set and falls back to the configured level
//! otherwise.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: startup (with the number of seeded or loaded entities) and shutdown
//! - **Mutations**: `Created`, `Vote recorded`, `Action ok`, each with the entity id
//! - **Rejections**: duplicate votes, missing dependencies and store failures at `warn`
//! - **Client calls**: one span per call via `#[instrument(skip(self))]`
//!
//! ```bash
//! # Lifecycle and committed mutations
//! RUST_LOG=info cargo run
//!
//! # Request payloads and cache hits
//! RUST_LOG=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a vote looks like:
//!
//! ```text
//! INFO vote: Vote recorded post_id=... voter_id=... direction=Up upvotes=1 downvotes=0 karma=1 elapsed_ms=0
//! INFO Tell ok id=...
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // entity_type and ids carry the context instead
        .compact()
        .init();
}
