use axum::{ extract::State, response::IntoResponse, Json };
use serde::Serialize;
use std::{ sync::Arc, time::{ SystemTime, UNIX_EPOCH } };

use crate::{
    AppState,
    errors::{ HttpError, ErrorMessage },
    middleware::metrics::MetricsSummary,
};

/// Health check endpoint data
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub timestamp: u64,
    pub uptime_seconds: u64,
    pub version: String,
    pub environment: String,
    pub attendance_service: String,
}

impl HealthCheck {
    pub fn new(state: &AppState) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            uptime_seconds: state.metrics.get_summary().uptime_seconds,
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.config.gateway.environment.clone(),
            attendance_service: state.upstream.base_url().to_string(),
        }
    }
}

pub async fn handler_404() -> HttpError {
    HttpError::not_found(ErrorMessage::NotFound.to_string())
}

pub async fn root() -> &'static str {
    "Attendance gateway"
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthCheck::new(&state))
}

pub async fn metrics_summary(State(state): State<Arc<AppState>>) -> Json<MetricsSummary> {
    Json(state.metrics.get_summary())
}
