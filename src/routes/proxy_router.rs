use std::{ collections::BTreeMap, sync::Arc };

use axum::{
    body::Bytes,
    extract::{ Path, RawQuery, State },
    handler::Handler,
    http::{ HeaderMap, Method },
    routing::{ MethodFilter, MethodRouter },
    Router,
};
use tracing::error;

use crate::{
    AppState,
    handlers::proxy_handlers::{ proxy_plain, proxy_with_params },
    proxy::RouteSpec,
};

type StateRef = Arc<AppState>;

/// Build the router for a route table. Routes sharing a path are folded into
/// one `MethodRouter`.
pub fn proxy_routes(specs: Vec<RouteSpec>) -> Router<StateRef> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<StateRef>> = BTreeMap::new();

    for spec in specs {
        let Some(filter) = method_filter(&spec.method) else {
            error!(route = spec.name, method = %spec.method, "unsupported method, route skipped");
            continue;
        };

        let path = spec.path;
        let existing = by_path.remove(path);
        let route = Arc::new(spec);

        let method_router = if route.path_params().is_empty() {
            add(
                existing,
                filter,
                move |state: State<StateRef>, query: RawQuery, headers: HeaderMap, body: Bytes| {
                    proxy_plain(state, query, headers, route.clone(), body)
                }
            )
        } else {
            add(
                existing,
                filter,
                move |
                    state: State<StateRef>,
                    params: Path<std::collections::HashMap<String, String>>,
                    query: RawQuery,
                    headers: HeaderMap,
                    body: Bytes
                | {
                    proxy_with_params(state, params, query, headers, route.clone(), body)
                }
            )
        };

        by_path.insert(path, method_router);
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| router.route(path, method_router))
}

fn add<H, T>(existing: Option<MethodRouter<StateRef>>, filter: MethodFilter, handler: H) -> MethodRouter<StateRef>
    where H: Handler<T, StateRef>, T: 'static
{
    match existing {
        Some(method_router) => method_router.on(filter, handler),
        None => axum::routing::on(filter, handler),
    }
}

fn method_filter(method: &Method) -> Option<MethodFilter> {
    if *method == Method::GET {
        Some(MethodFilter::GET)
    } else if *method == Method::POST {
        Some(MethodFilter::POST)
    } else if *method == Method::PUT {
        Some(MethodFilter::PUT)
    } else if *method == Method::DELETE {
        Some(MethodFilter::DELETE)
    } else if *method == Method::PATCH {
        Some(MethodFilter::PATCH)
    } else {
        None
    }
}
