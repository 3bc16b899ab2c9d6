use std::sync::Arc;

use axum::Router;

use crate::{ AppState, proxy::routes };

pub mod general_router;
pub mod proxy_router;

use general_router::general_routes;
use proxy_router::proxy_routes;

/// Main application router assembly function
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // Attendance Service pass-through routes under /api
        .merge(proxy_routes(routes()))
        // Health check, metrics, 404 fallback
        .merge(general_routes())
}
