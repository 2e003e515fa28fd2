//! HTTP API
//!
//! Webhook verification and delivery, the admin query surface and health.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::runtime::ProductionEngine;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProductionEngine>,
    pub db: Database,
    /// Webhook verification token; `None` rejects every handshake
    pub verify_token: Option<String>,
    /// Admin shared secret; `None` rejects every admin request
    pub api_key: Option<String>,
}
