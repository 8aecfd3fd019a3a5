// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod advice;
pub mod api;
pub mod config;
pub mod history;
pub mod knowledge;
pub mod matcher;
pub mod metrics;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::advice::{compose, Advice, AdvicePolicy};
pub use crate::api::{router, AppState};
pub use crate::knowledge::{KnowledgeBase, KnowledgeError, TopicRecord};
pub use crate::matcher::{score_and_select, MatchResult};

use axum::Router;

/// Build the full in-process app from the environment (settings + knowledge base).
pub async fn app() -> anyhow::Result<Router> {
    let state = AppState::from_env()?;
    Ok(router(state))
}
