use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use std::fmt;
use serde::{ Serialize, Deserialize };
use thiserror::Error;

/// JSON body of every error this gateway generates itself.
///
/// Errors relayed from the Attendance Service keep the service's own body;
/// only failures produced on this side of the boundary look like this.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.kind.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    UpstreamUnavailable,
    UpstreamMalformed,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::UpstreamMalformed => "upstream_malformed",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    InternalServerError,
    NotFound,
    InvalidJsonBody,
    MultipartRequired,
    MissingQueryParams(Vec<String>),
    UpstreamUnavailable,
    UpstreamTimeout,
    MalformedUpstream,
    UnexpectedUpstreamShape(&'static str),
}

impl ToString for ErrorMessage {
    fn to_string(&self) -> String {
        self.to_str()
    }
}

impl ErrorMessage {
    fn to_str(&self) -> String {
        match self {
            ErrorMessage::InternalServerError =>
                "Server Error. Please try again later.".to_string(),
            ErrorMessage::NotFound => "The requested resource could not be found".to_string(),
            ErrorMessage::InvalidJsonBody => "Request body must be valid JSON".to_string(),
            ErrorMessage::MultipartRequired =>
                "Request body must be multipart/form-data".to_string(),
            ErrorMessage::MissingQueryParams(names) => format!("{} required", join_names(names)),
            ErrorMessage::UpstreamUnavailable =>
                "Attendance service is unreachable, please try again".to_string(),
            ErrorMessage::UpstreamTimeout =>
                "Attendance service did not respond in time".to_string(),
            ErrorMessage::MalformedUpstream =>
                "Attendance service returned a response that is not valid JSON".to_string(),
            ErrorMessage::UnexpectedUpstreamShape(expected) =>
                format!("Attendance service returned an unexpected payload, expected {}", expected),
        }
    }
}

/// "a is", "a and b are", "a, b, and c are"
fn join_names(names: &[String]) -> String {
    match names {
        [] => "parameters are".to_string(),
        [one] => format!("{} is", one),
        [first, second] => format!("{} and {} are", first, second),
        [init @ .., last] => format!("{}, and {} are", init.join(", "), last),
    }
}

#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
    pub kind: ErrorKind,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode, kind: ErrorKind) -> Self {
        HttpError {
            message: message.into(),
            status,
            kind,
        }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Internal)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST, ErrorKind::Validation)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND, ErrorKind::NotFound)
    }

    pub fn bad_gateway(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self::new(message, StatusCode::BAD_GATEWAY, kind)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::GATEWAY_TIMEOUT, ErrorKind::UpstreamUnavailable)
    }

    pub fn into_http_response(self) -> Response {
        let response = Json(ErrorResponse {
            error: self.message,
            kind: self.kind,
        });

        (self.status, response).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpError: message: {}, status: {}", self.message, self.status)
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Failures of the forwarding path itself, as opposed to application errors
/// reported by the Attendance Service (those are relayed, not raised).
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("missing required query parameters: {0:?}")]
    MissingQuery(Vec<String>),

    #[error("request body is not valid JSON: {0}")]
    InvalidJsonBody(#[source] serde_json::Error),

    #[error("request body must be multipart/form-data")]
    MultipartRequired,

    #[error("route template references unknown path parameter `{0}`")]
    MissingPathParam(String),

    #[error("could not build upstream url: {0}")]
    InvalidUpstreamUrl(String),

    #[error("attendance service unreachable: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),

    #[error("attendance service timed out: {0}")]
    UpstreamTimeout(#[source] reqwest::Error),

    #[error("attendance service answered {status} with a body that is not JSON")]
    MalformedUpstream {
        status: StatusCode,
    },

    #[error("attendance service answered with {found} where {expected} was expected")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
}

impl ProxyError {
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            ProxyError::UpstreamUnavailable(_) |
                ProxyError::UpstreamTimeout(_) |
                ProxyError::MalformedUpstream { .. } |
                ProxyError::UnexpectedShape { .. }
        )
    }
}

impl From<ProxyError> for HttpError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::MissingQuery(names) =>
                HttpError::bad_request(ErrorMessage::MissingQueryParams(names).to_string()),
            ProxyError::InvalidJsonBody(_) =>
                HttpError::bad_request(ErrorMessage::InvalidJsonBody.to_string()),
            ProxyError::MultipartRequired =>
                HttpError::bad_request(ErrorMessage::MultipartRequired.to_string()),
            ProxyError::MissingPathParam(_) | ProxyError::InvalidUpstreamUrl(_) =>
                HttpError::server_error(ErrorMessage::InternalServerError.to_string()),
            ProxyError::UpstreamUnavailable(_) =>
                HttpError::bad_gateway(
                    ErrorMessage::UpstreamUnavailable.to_string(),
                    ErrorKind::UpstreamUnavailable
                ),
            ProxyError::UpstreamTimeout(_) =>
                HttpError::gateway_timeout(ErrorMessage::UpstreamTimeout.to_string()),
            ProxyError::MalformedUpstream { .. } =>
                HttpError::bad_gateway(
                    ErrorMessage::MalformedUpstream.to_string(),
                    ErrorKind::UpstreamMalformed
                ),
            ProxyError::UnexpectedShape { expected, .. } =>
                HttpError::bad_gateway(
                    ErrorMessage::UnexpectedUpstreamShape(expected).to_string(),
                    ErrorKind::UpstreamMalformed
                ),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}
