use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{ de::DeserializeOwned, Serialize };
use serde_json::Value;
use thiserror::Error;
use tracing::{ debug, info, warn };
use url::Url;
use validator::{ Validate, ValidationErrors };

use crate::{
    dashboard::views::{ DefaulterThreshold, MissingMark },
    dto::{
        HistoryQuery,
        LoginRequest,
        LoginResponse,
        MarkAttendanceRequest,
        ReportQuery,
        SessionQuery,
        SessionUpdateRequest,
    },
    models::{
        Assignment,
        AttendanceReportRow,
        Batch,
        Department,
        HistoricalData,
        SessionRecord,
        Staff,
        StaffAssignments,
        Subject,
        SubjectOption,
    },
    session::{ AuthUser, Role, Session },
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway (or the service behind it) answered with a non-2xx status.
    #[error("{message} ({status})")]
    Api {
        status: StatusCode,
        message: String,
    },

    #[error("unexpected response payload: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid gateway url: {0}")]
    Url(#[from] url::ParseError),

    #[error("not logged in")]
    NotLoggedIn,
}

impl ClientError {
    /// The line a dashboard would show in its error toast.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::NotLoggedIn => "Please log in again.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Browser-side view of the gateway: one cookie jar, one session.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl GatewayClient {
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        Ok(Self {
            http: Self::build_http()?,
            base_url,
            session: Session::new(),
        })
    }

    fn build_http() -> Result<reqwest::Client, ClientError> {
        Ok(reqwest::Client::builder().cookie_store(true).build()?)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `path` below the base URL, keeping any prefix it carries.
    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)]
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        debug!(%url, "GET");
        let response = self.http.get(url).query(query).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }

    /// Sign in as `role`. On success the service's cookie lands in this
    /// client's jar and the session is started.
    pub async fn login(
        &mut self,
        role: Role,
        credentials: &LoginRequest
    ) -> Result<AuthUser, ClientError> {
        credentials.validate()?;

        let response: LoginResponse = self.post(role.login_path(), credentials).await?;
        let mut user = AuthUser::new(
            response.full_name.unwrap_or_else(|| credentials.username.clone()),
            role
        );
        user.dept_code = response.department_code;

        info!(role = role.as_str(), "login succeeded");
        self.session.begin(user.clone());
        Ok(user)
    }

    /// Forget the session and drop every cookie the client was holding.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.http = Self::build_http()?;
        self.session.clear();
        Ok(())
    }

    fn require_session(&self) -> Result<Role, ClientError> {
        self.session.role().ok_or(ClientError::NotLoggedIn)
    }

    pub async fn batches(&self) -> Result<Vec<Batch>, ClientError> {
        self.get("/api/admin/batches", &[]).await
    }

    pub async fn batch(&self, id: i64) -> Result<Batch, ClientError> {
        self.get(&format!("/api/admin/batches/{}", id), &[]).await
    }

    pub async fn departments(&self) -> Result<Vec<Department>, ClientError> {
        self.get("/api/admin/departments", &[]).await
    }

    pub async fn subjects(&self) -> Result<Vec<Subject>, ClientError> {
        self.get("/api/admin/subjects", &[]).await
    }

    pub async fn staff(&self) -> Result<Vec<Staff>, ClientError> {
        self.get("/api/admin/staff", &[]).await
    }

    pub async fn assignments(&self) -> Result<Vec<Assignment>, ClientError> {
        self.get("/api/admin/assignments", &[]).await
    }

    pub async fn hod_batches(&self) -> Result<Vec<Batch>, ClientError> {
        self.get("/api/hod/batches", &[]).await
    }

    pub async fn hod_subjects(&self) -> Result<Vec<Subject>, ClientError> {
        self.get("/api/hod/subjects", &[]).await
    }

    pub async fn staff_assignments(&self) -> Result<StaffAssignments, ClientError> {
        self.get("/api/staff/assignments", &[]).await
    }

    pub async fn subjects_for_batch(
        &self,
        role: Role,
        batch_id: i64
    ) -> Result<Vec<SubjectOption>, ClientError> {
        self.get(&role.subjects_by_batch_path(batch_id), &[]).await
    }

    pub async fn admin_attendance_report(
        &self,
        query: &ReportQuery
    ) -> Result<Vec<AttendanceReportRow>, ClientError> {
        query.validate()?;
        self.get("/api/admin/attendance-report", &query.to_pairs()).await
    }

    pub async fn staff_report(
        &self,
        batch_id: i64,
        subject_id: i64
    ) -> Result<Vec<AttendanceReportRow>, ClientError> {
        self.require_session()?;
        self.get(
            "/api/staff/reports",
            &[
                ("batch_id", batch_id.to_string()),
                ("subject_id", subject_id.to_string()),
            ]
        ).await
    }

    /// Defaulter rows for a batch. The threshold, when given, is passed on
    /// to the service; callers still classify with [`DefaulterThreshold`].
    pub async fn defaulters(
        &self,
        batch_id: i64,
        threshold: Option<DefaulterThreshold>
    ) -> Result<Vec<AttendanceReportRow>, ClientError> {
        self.require_session()?;
        let mut query = vec![("batch_id", batch_id.to_string())];
        if let Some(threshold) = threshold {
            query.push(("threshold", threshold.value().to_string()));
        }
        self.get("/api/staff/defaulters", &query).await
    }

    pub async fn historical_attendance(
        &self,
        query: &HistoryQuery
    ) -> Result<HistoricalData, ClientError> {
        query.validate()?;
        self.get("/api/historical-attendance", &query.to_pairs()).await
    }

    /// Marks of one recorded session, ready for an edit form: students
    /// without a mark start out absent.
    pub async fn attendance_session(
        &self,
        query: &SessionQuery
    ) -> Result<Vec<SessionRecord>, ClientError> {
        self.require_session()?;
        query.validate()?;
        let mut records: Vec<SessionRecord> = self.get(
            "/api/admin/attendance/session",
            &query.to_pairs()
        ).await?;
        for record in &mut records {
            record.status = MissingMark::Absent.prefill(record.status);
        }
        Ok(records)
    }

    pub async fn update_attendance_session(
        &self,
        date: NaiveDate,
        records: &[SessionRecord]
    ) -> Result<Value, ClientError> {
        self.require_session()?;
        let request = SessionUpdateRequest::from_records(date, records);
        request.validate()?;
        info!(%date, updates = request.updates.len(), "saving edited attendance session");
        self.post("/api/admin/attendance/session", &request).await
    }

    pub async fn mark_attendance(&self, request: &MarkAttendanceRequest) -> Result<Value, ClientError> {
        request.validate()?;
        self.post("/api/staff/attendance", request).await
    }

    pub async fn validate_absentees(
        &self,
        request: &MarkAttendanceRequest
    ) -> Result<Value, ClientError> {
        request.validate()?;
        self.post("/api/staff/attendance/validate", request).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = error_message(status, &bytes);
        warn!(status = status.as_u16(), %message, "gateway returned an error");
        return Err(ClientError::Api { status, message });
    }

    Ok(serde_json::from_slice(&bytes)?)
}

/// Pull the `error` (or `message`) string out of an error body.
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    serde_json
        ::from_slice::<Value>(bytes)
        .ok()
        .and_then(|body| {
            ["error", "message"]
                .iter()
                .find_map(|key| body.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}
