// Library entry point - the attendance gateway as a reusable library

// Proxy Route Layer
pub mod config;
pub mod errors;
pub mod proxy;
pub mod middleware;
pub mod handlers;
pub mod routes;

// Dashboard/Report Composition Layer
pub mod models;
pub mod dto;
pub mod session;
pub mod dashboard;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::{ Config, ConfigError, GatewayConfig };
pub use errors::{ HttpError, ErrorMessage, ProxyError };
pub use proxy::{ RouteSpec, UpstreamClient };
pub use session::{ AuthUser, Role, Session };
pub use dashboard::{ ClientError, GatewayClient };

use std::sync::Arc;
use axum::{ extract::DefaultBodyLimit, middleware::from_fn_with_state, Router };
use tower_http::{ catch_panic::CatchPanicLayer, trace::TraceLayer };

use middleware::{
    cors::create_cors_layer,
    metrics::{ metrics_middleware, MetricsCollector },
    security_headers::security_headers,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
    pub metrics: MetricsCollector,
}

impl AppState {
    /// Create a new application state from the environment
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(Config::new()?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let upstream = UpstreamClient::from_config(&config.gateway).map_err(|e| {
            ConfigError::Config(format!("Failed to build attendance service client: {}", e))
        })?;

        Ok(Self {
            config,
            upstream,
            metrics: MetricsCollector::new(),
        })
    }
}

/// Create the complete application router with its middleware stack
pub fn create_app(state: Arc<AppState>) -> Router {
    let gateway = &state.config.gateway;

    routes
        ::create_router()
        .layer(from_fn_with_state(state.clone(), metrics_middleware))
        .layer(from_fn_with_state(state.clone(), security_headers))
        .layer(DefaultBodyLimit::max(gateway.max_upload_bytes))
        .layer(create_cors_layer(gateway))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize the application with all dependencies
pub fn initialize_app() -> Result<(Router, Arc<AppState>), ConfigError> {
    let state = Arc::new(AppState::new()?);
    let router = create_app(state.clone());
    Ok((router, state))
}
