use std::{ collections::HashMap, sync::Arc };

use axum::{
    body::Bytes,
    extract::{ Path, RawQuery, State },
    http::HeaderMap,
    response::{ IntoResponse, Response },
};
use tracing::warn;

use crate::{ AppState, proxy::{ forward, InboundRequest, RouteSpec } };

/// Run one proxied request for `route` and turn the outcome into a response.
pub async fn proxy_request(
    state: Arc<AppState>,
    route: Arc<RouteSpec>,
    path_params: HashMap<String, String>,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes
) -> Response {
    let inbound = InboundRequest {
        path_params,
        query,
        headers,
        body,
    };

    match forward(&state.upstream, &route, inbound).await {
        Ok(response) => response.into_response(),
        Err(err) => {
            if err.is_upstream_failure() {
                state.metrics.record_upstream_failure(route.name);
            } else {
                warn!(route = route.name, "request rejected: {}", err);
            }
            err.into_response()
        }
    }
}

/// Handler for routes whose template carries `{param}` segments.
pub async fn proxy_with_params(
    State(state): State<Arc<AppState>>,
    Path(path_params): Path<HashMap<String, String>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    route: Arc<RouteSpec>,
    body: Bytes
) -> Response {
    proxy_request(state, route, path_params, query, headers, body).await
}

/// Handler for fixed paths.
pub async fn proxy_plain(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    route: Arc<RouteSpec>,
    body: Bytes
) -> Response {
    proxy_request(state, route, HashMap::new(), query, headers, body).await
}
