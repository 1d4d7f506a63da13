//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use crate::client::{FosmisClient, HtmlCache};
use crate::config::AppConfig;

/// State shared by every request handler.
pub struct AppState {
    pub config: AppConfig,
    pub client: FosmisClient,
    pub cache: Arc<HtmlCache>,
    pub started_at: Instant,
}
