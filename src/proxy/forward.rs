use std::collections::HashMap;

use axum::{
    body::Bytes,
    http::{ header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode },
    response::{ IntoResponse, Response },
    Json,
};
use serde_json::{ json, Value };
use tracing::{ debug, error, info, warn };
use url::Url;

use crate::{
    errors::{ ErrorKind, ErrorMessage, ProxyError },
    proxy::{
        headers::{ append_set_cookies, inbound_cookies, multipart_content_type, upstream_set_cookies },
        route_table::{ BodyPolicy, QueryPolicy, RouteSpec },
        upstream::UpstreamClient,
    },
};

/// The parts of a browser request the forwarder looks at.
#[derive(Debug, Default, Clone)]
pub struct InboundRequest {
    pub path_params: HashMap<String, String>,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What goes back to the browser: status, parsed JSON and any relayed cookies.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookies: Vec<HeaderValue>,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        append_set_cookies(response.headers_mut(), &self.set_cookies);
        response
    }
}

enum OutboundBody {
    None,
    Json(Value),
    Multipart {
        content_type: HeaderValue,
        bytes: Bytes,
    },
}

/// Forward one inbound request to the Attendance Service and interpret the answer.
///
/// Local validation (query parameters, body format) happens before any
/// network call. A 2xx answer becomes a 200 carrying the same JSON; any other
/// status is relayed together with the service's error body.
pub async fn forward(
    upstream: &UpstreamClient,
    route: &RouteSpec,
    inbound: InboundRequest
) -> Result<ProxyResponse, ProxyError> {
    let query = outbound_query(&route.query, inbound.query.as_deref())?;
    let body = outbound_body(route.body, &inbound)?;
    let cookies = inbound_cookies(&inbound.headers);

    let url = upstream_url(upstream, route.upstream, &inbound.path_params, query.as_deref())?;
    let mut answer = send(upstream, route, url, &cookies, &body).await?;

    if let Some(fallback) = route.fallback_upstream {
        if answer.status == StatusCode::UNAUTHORIZED || answer.status == StatusCode::FORBIDDEN {
            debug!(route = route.name, status = %answer.status, "retrying against fallback upstream");
            let url = upstream_url(upstream, fallback, &inbound.path_params, query.as_deref())?;
            answer = send(upstream, route, url, &cookies, &body).await?;
        }
    }

    interpret(route, answer)
}

struct UpstreamAnswer {
    status: StatusCode,
    headers: HeaderMap,
    bytes: Bytes,
}

async fn send(
    upstream: &UpstreamClient,
    route: &RouteSpec,
    url: Url,
    cookies: &[HeaderValue],
    body: &OutboundBody
) -> Result<UpstreamAnswer, ProxyError> {
    debug!(route = route.name, method = %route.method, %url, "forwarding request");

    let mut request = upstream.request(route.method.clone(), url.clone());
    for cookie in cookies {
        request = request.header(axum::http::header::COOKIE, cookie.clone());
    }

    request = match body {
        OutboundBody::None => request,
        OutboundBody::Json(value) => request.json(value),
        OutboundBody::Multipart { content_type, bytes } =>
            request.header(CONTENT_TYPE, content_type.clone()).body(bytes.clone()),
    };

    let response = request.send().await.map_err(|e| {
        error!(route = route.name, %url, "attendance service request failed: {}", e);
        if e.is_timeout() { ProxyError::UpstreamTimeout(e) } else { ProxyError::UpstreamUnavailable(e) }
    })?;

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.bytes().await.map_err(|e| {
        error!(route = route.name, %url, "failed to read attendance service body: {}", e);
        if e.is_timeout() { ProxyError::UpstreamTimeout(e) } else { ProxyError::UpstreamUnavailable(e) }
    })?;

    info!(route = route.name, %url, status = status.as_u16(), "attendance service answered");

    Ok(UpstreamAnswer { status, headers, bytes })
}

fn interpret(route: &RouteSpec, answer: UpstreamAnswer) -> Result<ProxyResponse, ProxyError> {
    let set_cookies = if route.relay_set_cookie {
        upstream_set_cookies(&answer.headers)
    } else {
        Vec::new()
    };

    let body: Value = match serde_json::from_slice(&answer.bytes) {
        Ok(body) => body,
        Err(_) => {
            warn!(route = route.name, status = %answer.status, "attendance service body is not JSON");
            if answer.status.is_success() {
                return Err(ProxyError::MalformedUpstream { status: answer.status });
            }
            // Keep the service's error status; only the body is replaced.
            return Ok(ProxyResponse {
                status: answer.status,
                body: json!({
                    "error": ErrorMessage::MalformedUpstream.to_string(),
                    "kind": ErrorKind::UpstreamMalformed.as_str(),
                }),
                set_cookies,
            });
        }
    };

    if !answer.status.is_success() {
        warn!(route = route.name, status = %answer.status, "attendance service reported an error");
        return Ok(ProxyResponse {
            status: answer.status,
            body,
            set_cookies,
        });
    }

    if !route.response_shape.matches(&body) {
        return Err(ProxyError::UnexpectedShape {
            expected: route.response_shape.describe(),
            found: json_kind(&body),
        });
    }

    Ok(ProxyResponse {
        status: StatusCode::OK,
        body,
        set_cookies,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Resolve the query string to send upstream, rejecting missing required keys.
pub fn outbound_query(
    policy: &QueryPolicy,
    inbound: Option<&str>
) -> Result<Option<String>, ProxyError> {
    match policy {
        QueryPolicy::Drop => Ok(None),
        QueryPolicy::ForwardAll => Ok(inbound.filter(|q| !q.is_empty()).map(str::to_string)),
        QueryPolicy::Select { required, optional } => {
            let pairs: Vec<(String, String)> = url::form_urlencoded
                ::parse(inbound.unwrap_or("").as_bytes())
                .into_owned()
                .collect();
            let lookup = |key: &str| {
                pairs
                    .iter()
                    .find(|(k, v)| k == key && !v.is_empty())
                    .map(|(_, v)| v.as_str())
            };

            let missing: Vec<String> = required
                .iter()
                .filter(|key| lookup(key).is_none())
                .map(|key| key.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(ProxyError::MissingQuery(missing));
            }

            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for key in required.iter().chain(optional.iter()) {
                if let Some(value) = lookup(key) {
                    serializer.append_pair(key, value);
                }
            }
            let encoded = serializer.finish();
            Ok((!encoded.is_empty()).then_some(encoded))
        }
    }
}

fn outbound_body(policy: BodyPolicy, inbound: &InboundRequest) -> Result<OutboundBody, ProxyError> {
    match policy {
        BodyPolicy::Empty => Ok(OutboundBody::None),
        BodyPolicy::Json => {
            let value: Value = serde_json
                ::from_slice(&inbound.body)
                .map_err(ProxyError::InvalidJsonBody)?;
            Ok(OutboundBody::Json(value))
        }
        BodyPolicy::Multipart => {
            let content_type = multipart_content_type(&inbound.headers).ok_or(
                ProxyError::MultipartRequired
            )?;
            Ok(OutboundBody::Multipart {
                content_type,
                bytes: inbound.body.clone(),
            })
        }
    }
}

/// Substitute `{param}` segments of `template` and append the query string.
pub fn upstream_url(
    upstream: &UpstreamClient,
    template: &str,
    params: &HashMap<String, String>,
    query: Option<&str>
) -> Result<Url, ProxyError> {
    let segments = template
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) =>
                    params
                        .get(name)
                        .cloned()
                        .ok_or_else(|| ProxyError::MissingPathParam(name.to_string())),
                None => Ok(segment.to_string()),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut url = upstream.url_for(&segments)?;
    url.set_query(query);
    Ok(url)
}
