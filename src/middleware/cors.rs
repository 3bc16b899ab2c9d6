use axum::http::{ header::{ ACCEPT, CONTENT_TYPE, COOKIE }, HeaderValue, Method };
use tower_http::cors::{ AllowOrigin, CorsLayer };
use tracing::warn;

use crate::config::GatewayConfig;

pub fn create_cors_layer(config: &GatewayConfig) -> CorsLayer {
    let origin = match config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            warn!("ALLOWED_ORIGIN is not a valid header value, cross-origin requests are disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    let layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_headers([CONTENT_TYPE, COOKIE, ACCEPT])
        .allow_credentials(true);

    if config.is_production() {
        layer.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    } else {
        layer.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
    }
}
