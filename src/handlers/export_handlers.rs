use std::sync::Arc;

use axum::{
    extract::{ RawQuery, State },
    http::HeaderMap,
    response::{ IntoResponse, Response },
};
use tracing::{ info, warn };

use crate::{
    AppState,
    dashboard::{ defaulters, report_csv, CsvExport, DefaulterThreshold },
    errors::{ ErrorKind, ErrorMessage, HttpError },
    models::AttendanceReportRow,
    proxy::{ forward, staff_defaulters, InboundRequest },
};

/// `GET /api/exports/defaulters?batch_id=..[&threshold=..]`
///
/// Fetches the batch's report through the defaulter route and sends the
/// students under the threshold back as a CSV download. Without a
/// `threshold` the configured default applies.
pub async fn export_defaulters(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap
) -> Result<Response, HttpError> {
    let params: Vec<(String, String)> = url::form_urlencoded
        ::parse(query.as_deref().unwrap_or("").as_bytes())
        .into_owned()
        .collect();
    let param = |key: &str| {
        params
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.clone())
    };

    // The id names the download, so only an integer may reach the header.
    let batch_id: i64 = match param("batch_id") {
        Some(raw) =>
            raw
                .trim()
                .parse()
                .map_err(|_| HttpError::bad_request("batch_id must be an integer"))?,
        None => {
            return Err(
                HttpError::bad_request(
                    ErrorMessage::MissingQueryParams(vec!["batch_id".to_string()]).to_string()
                )
            );
        }
    };

    let threshold = match param("threshold") {
        Some(raw) =>
            raw
                .parse::<f64>()
                .ok()
                .and_then(DefaulterThreshold::new)
                .ok_or_else(|| HttpError::bad_request("threshold must be a number between 0 and 100"))?,
        None =>
            DefaulterThreshold::new(state.config.gateway.defaulter_threshold).unwrap_or_default(),
    };

    let route = staff_defaulters();
    let inbound = InboundRequest {
        query,
        headers,
        ..Default::default()
    };

    let answer = match forward(&state.upstream, &route, inbound).await {
        Ok(answer) => answer,
        Err(err) => {
            if err.is_upstream_failure() {
                state.metrics.record_upstream_failure("export_defaulters");
            }
            return Err(err.into());
        }
    };

    if !answer.status.is_success() {
        return Ok(answer.into_response());
    }

    let rows: Vec<AttendanceReportRow> = serde_json::from_value(answer.body).map_err(|e| {
        warn!("defaulter rows did not match the report schema: {}", e);
        state.metrics.record_upstream_failure("export_defaulters");
        HttpError::bad_gateway(ErrorMessage::MalformedUpstream.to_string(), ErrorKind::UpstreamMalformed)
    })?;

    let table = report_csv(defaulters(&rows, threshold));
    info!(batch_id, rows = table.rows.len(), threshold = threshold.value(), "exporting defaulters");

    Ok(CsvExport::new(format!("defaulters_{}.csv", batch_id), &table).into_response())
}
