use axum::{ routing::get, Router };
use std::sync::Arc;
use crate::{ AppState, handlers::{ export_handlers::export_defaulters, general_handlers::* } };

pub fn general_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_summary))
        .route("/api/exports/defaulters", get(export_defaulters))
        .fallback(handler_404)
}
