use crate::db::DbPool;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Document store behind the process-wide gate
    pub db: DbPool,
    /// Posts per page for the per-user post listing
    pub posts_page_size: usize,
}
