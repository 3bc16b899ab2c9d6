use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{ HeaderMap, HeaderValue, Request },
    middleware::Next,
    response::Response,
};

use crate::AppState;

const PRODUCTION_CSP: &str =
    "default-src 'self'; \
     script-src 'self'; \
     style-src 'self'; \
     img-src 'self' data:; \
     font-src 'self'; \
     object-src 'none'; \
     frame-ancestors 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     upgrade-insecure-requests";

// Dashboards are often served by a dev server on another port.
const DEVELOPMENT_CSP: &str =
    "default-src * data: blob: 'unsafe-inline' 'unsafe-eval'; \
     connect-src *; \
     frame-ancestors *";

pub async fn security_headers(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next
) -> Response {
    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), state.config.gateway.is_production());
    response
}

pub fn apply_security_headers(headers: &mut HeaderMap, production: bool) {
    headers.insert("X-DNS-Prefetch-Control", HeaderValue::from_static("off"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Permitted-Cross-Domain-Policies", HeaderValue::from_static("none"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("strict-origin-when-cross-origin"));

    if production {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=15552000; includeSubDomains")
        );
        headers.insert("Content-Security-Policy", HeaderValue::from_static(PRODUCTION_CSP));
    } else {
        headers.insert("Content-Security-Policy", HeaderValue::from_static(DEVELOPMENT_CSP));
    }
}
