use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::publishing::store::PostStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `LlmClient` in production, scripted fakes in tests.
    pub llm: Arc<dyn CompletionProvider>,
    /// `PgPostStore` when `DATABASE_URL` is set, otherwise `MemoryPostStore`.
    pub posts: Arc<dyn PostStore>,
    pub config: Config,
}
