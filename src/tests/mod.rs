// Integration tests: the gateway in front of a stub Attendance Service

#[cfg(test)]
pub mod test_utils {
    use std::{ net::SocketAddr, sync::{ Arc, Mutex } };

    use axum::{
        body::{ Body, Bytes },
        extract::{ Request, State },
        http::{ header, Method, StatusCode },
        response::{ IntoResponse, Response },
        Json,
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{ json, Value };
    use tokio::net::TcpListener;
    use url::Url;

    use crate::{ config::logging::try_init_logging, AppState, Config, GatewayConfig, create_app };

    /// What the stub service saw for one request.
    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: Method,
        pub path: String,
        pub query: Option<String>,
        pub cookie: Option<String>,
        pub content_type: Option<String>,
        pub body: Bytes,
    }

    #[derive(Clone, Default)]
    pub struct StubLog(Arc<Mutex<Vec<Recorded>>>);

    impl StubLog {
        pub fn requests(&self) -> Vec<Recorded> {
            self.0.lock().unwrap().clone()
        }

        pub fn last(&self) -> Recorded {
            self.requests().pop().expect("stub received no request")
        }

        pub fn count(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    pub const SESSION_COOKIE: &str = "session=abc123; HttpOnly; Path=/; SameSite=Lax";

    fn login_ok(body: Value, cookie: &str) -> Response {
        let mut response = Json(body).into_response();
        response.headers_mut().append(header::SET_COOKIE, cookie.parse().unwrap());
        response
    }

    fn report_rows() -> Value {
        json!([
            { "student_id": 1, "roll_no": "CS01", "name": "O'Brien, Jr.", "attended_lectures": 9, "total_lectures": 10, "percentage": 90.0 },
            { "student_id": 2, "roll_no": "CS02", "name": "Vikram", "attended_lectures": 7, "total_lectures": 10, "percentage": 70.0 },
            { "student_id": 3, "roll_no": "CS03", "name": "Meera", "attended_lectures": 15, "total_lectures": 20, "percentage": 75.0 }
        ])
    }

    async fn stub(State(log): State<StubLog>, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let body = body.collect().await.map(|b| b.to_bytes()).unwrap_or_default();
        let header_str = |name: header::HeaderName| {
            parts.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
        };
        let cookie = header_str(header::COOKIE);
        let path = parts.uri.path().to_string();

        log.0
            .lock()
            .unwrap()
            .push(Recorded {
                method: parts.method.clone(),
                path: path.clone(),
                query: parts.uri.query().map(str::to_string),
                cookie: cookie.clone(),
                content_type: header_str(header::CONTENT_TYPE),
                body: body.clone(),
            });

        let broken = cookie.as_deref().is_some_and(|c| c.contains("broken"));

        match (parts.method.as_str(), path.as_str()) {
            ("POST", "/admin/login") => {
                let payload: Value = serde_json::from_slice(&body).unwrap_or_default();
                match payload["username"].as_str() {
                    Some("broken") => login_ok(json!({ "message": "Login successful" }), "session=broken; Path=/"),
                    Some(_) if payload["password"] == "secret" =>
                        login_ok(json!({ "message": "Login successful" }), SESSION_COOKIE),
                    _ =>
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({ "error": "Invalid credentials" })),
                        ).into_response(),
                }
            }
            ("POST", "/hod/login") =>
                login_ok(
                    json!({ "message": "Login successful", "full_name": "Asha Rao", "department_code": "CSE" }),
                    SESSION_COOKIE
                ),
            ("POST", "/staff/login") => login_ok(json!({ "message": "Login successful" }), SESSION_COOKIE),
            ("GET", "/admin/batches") | ("GET", "/hod/batches") =>
                Json(
                    json!([
                        { "id": 1, "dept_name": "CSE", "class_number": "2", "academic_year": "2024-25", "semester": 3 },
                        { "id": 2, "dept_name": "CSE", "class_number": "3" }
                    ])
                ).into_response(),
            ("GET", "/admin/batches/404") =>
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Batch not found" }))).into_response(),
            ("GET", "/admin/batches/77") => Json(json!([])).into_response(),
            ("GET", "/admin/batches/410") =>
                (StatusCode::NOT_FOUND, "<!doctype html><title>404 Not Found</title>").into_response(),
            ("GET", p) if p.starts_with("/admin/batches/") =>
                Json(json!({ "id": 1, "dept_name": "CSE", "students": [] })).into_response(),
            ("DELETE", p) if p.starts_with("/admin/batches/") =>
                Json(json!({ "message": "deleted" })).into_response(),
            ("GET", "/admin/staff") => Json(json!([{ "id": 4, "username": "kp", "full_name": "K. Patil" }])).into_response(),
            ("GET", "/admin/subjects") | ("GET", "/hod/subjects") =>
                Json(json!([{ "id": 7, "subject_code": "CS301", "subject_name": "Databases" }])).into_response(),
            ("GET", "/admin/assignments") if broken =>
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "database unavailable" }))).into_response(),
            ("GET", "/admin/assignments") =>
                Json(
                    json!([{ "id": 1, "staff_id": 4, "subject_id": 7, "batch_id": 1, "lecture_type": "TH" }])
                ).into_response(),
            ("GET", "/admin/departments") => "<html>maintenance</html>".into_response(),
            ("GET", p) if p.starts_with("/admin/subjects-by-batch/") =>
                (StatusCode::FORBIDDEN, Json(json!({ "error": "Admins only" }))).into_response(),
            ("GET", p) if p.starts_with("/hod/subjects-by-batch/") =>
                Json(json!([{ "id": 7, "name": "Databases (CS301)" }])).into_response(),
            ("GET", "/admin/attendance-report") | ("GET", "/staff/attendance-report") =>
                Json(report_rows()).into_response(),
            ("GET", "/admin/historical-attendance") =>
                Json(
                    json!({
                        "headers": [{ "id": "s1", "label": "01/03 TH" }, { "id": "s2", "label": "02/03 TH" }],
                        "students": [{ "id": 1, "roll_no": "CS01", "enrollment_no": "EN1", "name": "Asha", "attendance": { "s1": "P" } }]
                    })
                ).into_response(),
            ("GET", "/staff/assignments") =>
                Json(
                    json!({
                        "7": { "subject_code": "CS301", "subject_name": "Databases", "batch_id": 1, "batch_name": "CSE 2", "lecture_types": { "TH": [null], "PR": [1, 2] } },
                        "8": { "subject_code": "CS302", "subject_name": "Networks", "batch_id": 1, "batch_name": "CSE 2", "lecture_types": { "TH": [null] } }
                    })
                ).into_response(),
            ("POST", "/admin/students/upload_csv") =>
                (StatusCode::CREATED, Json(json!({ "message": "uploaded", "bytes": body.len() }))).into_response(),
            ("GET", "/admin/attendance/session") =>
                Json(
                    json!([
                        { "student_id": 1, "roll_no": "CS01", "name": "Asha", "status": "absent", "assignment_id": 12 },
                        { "student_id": 2, "roll_no": "CS02", "name": "Vikram", "status": null, "assignment_id": 12 }
                    ])
                ).into_response(),
            ("POST", "/admin/attendance/session") => {
                let payload: Value = serde_json::from_slice(&body).unwrap_or_default();
                let updated = payload["updates"].as_array().map_or(0, Vec::len);
                Json(json!({ "message": "Attendance updated successfully.", "updated": updated })).into_response()
            }
            ("POST", "/staff/attendance") => Json(json!({ "message": "Attendance recorded" })).into_response(),
            _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "no such stub route" }))).into_response(),
        }
    }

    /// Start the stub service on an ephemeral port.
    pub async fn spawn_stub() -> (Url, StubLog) {
        let log = StubLog::default();
        let app = Router::new().fallback(stub).with_state(log.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (Url::parse(&format!("http://{}", addr)).unwrap(), log)
    }

    pub fn gateway_for(service_url: Url) -> Router {
        try_init_logging();
        let config = Config { gateway: GatewayConfig::for_service(service_url) };
        create_app(Arc::new(AppState::from_config(config).unwrap()))
    }

    /// The gateway, in-process, in front of a fresh stub.
    pub async fn setup_test_app() -> (Router, StubLog) {
        let (url, log) = spawn_stub().await;
        (gateway_for(url), log)
    }

    /// The gateway on a real socket, for the dashboard client.
    pub async fn spawn_gateway() -> (Url, StubLog) {
        let (app, log) = setup_test_app().await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (Url::parse(&format!("http://{}", addr)).unwrap(), log)
    }

    pub fn get(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

#[cfg(test)]
mod proxy_tests {
    use super::test_utils::*;
    use axum::{ body::Body, http::{ header, Request, StatusCode } };
    use serde_json::json;
    use tokio::net::TcpListener;
    use tower::ServiceExt;
    use url::Url;

    #[tokio::test]
    async fn success_is_relayed_as_200_with_same_body() {
        let (app, log) = setup_test_app().await;

        let response = app.oneshot(get("/api/admin/batches")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["id"], 1);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(log.last().path, "/admin/batches");
    }

    #[tokio::test]
    async fn created_status_becomes_200() {
        let (app, log) = setup_test_app().await;
        let boundary = "XBOUNDARY";
        let payload = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"s.csv\"\r\nContent-Type: text/csv\r\n\r\nroll_no,enrollment_no,name\r\n1,EN1,Asha\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/students/upload_csv")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(payload.clone()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "uploaded");

        let seen = log.last();
        assert_eq!(&seen.body[..], payload.as_bytes());
        assert_eq!(
            seen.content_type.as_deref(),
            Some("multipart/form-data; boundary=XBOUNDARY")
        );
    }

    #[tokio::test]
    async fn upload_without_multipart_is_rejected_locally() {
        let (app, log) = setup_test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/students/upload_csv")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(log.count(), 0);
    }

    #[tokio::test]
    async fn error_status_and_body_are_relayed() {
        let (app, _log) = setup_test_app().await;

        let response = app.oneshot(get("/api/admin/batches/404")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "error": "Batch not found" }));
    }

    #[tokio::test]
    async fn cookie_is_forwarded_unchanged() {
        let (app, log) = setup_test_app().await;
        let cookie = "session=abc123; theme=dark";
        let request = Request::builder()
            .uri("/api/admin/batches/5")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let seen = log.last();
        assert_eq!(seen.path, "/admin/batches/5");
        assert_eq!(seen.cookie.as_deref(), Some(cookie));
    }

    #[tokio::test]
    async fn no_cookie_is_sent_when_browser_has_none() {
        let (app, log) = setup_test_app().await;
        app.oneshot(get("/api/admin/staff")).await.unwrap();
        assert!(log.last().cookie.is_none());
    }

    #[tokio::test]
    async fn login_relays_set_cookie_byte_for_byte() {
        let (app, log) = setup_test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"admin","password":"secret"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::SET_COOKIE], SESSION_COOKIE);

        let seen = log.last();
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
        let sent: serde_json::Value = serde_json::from_slice(&seen.body).unwrap();
        assert_eq!(sent["username"], "admin");
    }

    #[tokio::test]
    async fn failed_login_keeps_service_error() {
        let (app, _log) = setup_test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/login")
            .body(Body::from(r#"{"username":"admin","password":"nope"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn non_login_routes_do_not_relay_set_cookie() {
        let (app, _log) = setup_test_app().await;
        let response = app.oneshot(get("/api/admin/batches")).await.unwrap();
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn missing_report_params_never_reach_the_service() {
        let (app, log) = setup_test_app().await;

        let response = app
            .oneshot(get("/api/admin/attendance-report?subject_id=7")).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "batch_id and lecture_type are required");
        assert_eq!(body["kind"], "validation");
        assert_eq!(log.count(), 0);
    }

    #[tokio::test]
    async fn report_params_are_forwarded() {
        let (app, log) = setup_test_app().await;
        let response = app
            .oneshot(get("/api/admin/attendance-report?batch_id=1&subject_id=7&lecture_type=TH")).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(log.last().query.as_deref(), Some("batch_id=1&subject_id=7&lecture_type=TH"));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_502() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = gateway_for(Url::parse(&format!("http://{}", addr)).unwrap());
        let response = app.oneshot(get("/api/admin/batches")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["kind"], "upstream_unavailable");
    }

    #[tokio::test]
    async fn non_json_answer_is_malformed() {
        let (app, _log) = setup_test_app().await;
        let response = app.oneshot(get("/api/admin/departments")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["kind"], "upstream_malformed");
    }

    #[tokio::test]
    async fn non_json_error_page_keeps_service_status() {
        let (app, _log) = setup_test_app().await;
        let response = app.oneshot(get("/api/admin/batches/410")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "upstream_malformed");
        assert!(body["error"].as_str().unwrap().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn wrong_payload_shape_is_malformed() {
        let (app, _log) = setup_test_app().await;
        let response = app.oneshot(get("/api/admin/batches/77")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["kind"], "upstream_malformed");
    }

    #[tokio::test]
    async fn subjects_by_batch_falls_back_to_hod() {
        let (app, log) = setup_test_app().await;
        let response = app.oneshot(get("/api/admin/subjects/by-batch/3")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await[0]["id"], 7);

        let paths: Vec<String> = log
            .requests()
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(paths, vec!["/admin/subjects-by-batch/3", "/hod/subjects-by-batch/3"]);
    }

    #[tokio::test]
    async fn delete_uses_the_same_method_upstream() {
        let (app, log) = setup_test_app().await;
        let request = Request::builder()
            .method("DELETE")
            .uri("/api/admin/batches/9")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(log.last().method, axum::http::Method::DELETE);
    }

    #[tokio::test]
    async fn defaulter_export_is_a_csv_of_students_below_threshold() {
        let (app, log) = setup_test_app().await;
        let response = app.oneshot(get("/api/exports/defaulters?batch_id=1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"defaulters_1.csv\""
        );
        let csv = body_text(response).await;
        assert_eq!(csv, "Roll No,Name,Batch,Attended,Total,Percentage\nCS02,Vikram,,7,10,70.00");
        assert_eq!(log.last().path, "/staff/attendance-report");
    }

    #[tokio::test]
    async fn defaulter_export_honours_threshold() {
        let (app, log) = setup_test_app().await;
        let response = app
            .oneshot(get("/api/exports/defaulters?batch_id=1&threshold=95")).await
            .unwrap();
        let csv = body_text(response).await;
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains("\"O'Brien, Jr.\""));
        assert_eq!(log.last().query.as_deref(), Some("batch_id=1&threshold=95"));
    }

    #[tokio::test]
    async fn defaulter_export_rejects_bad_threshold() {
        let (app, log) = setup_test_app().await;
        let response = app
            .oneshot(get("/api/exports/defaulters?batch_id=1&threshold=150")).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(log.count(), 0);
    }

    #[tokio::test]
    async fn defaulter_export_requires_integer_batch_id() {
        for uri in [
            "/api/exports/defaulters?batch_id=1%0D%0AX-Evil:%201",
            "/api/exports/defaulters?batch_id=abc%22%3B%20x",
            "/api/exports/defaulters?threshold=50",
        ] {
            let (app, log) = setup_test_app().await;
            let response = app.oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
            assert_eq!(body_json(response).await["kind"], "validation");
            assert_eq!(log.count(), 0, "{}", uri);
        }
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        let (app, _log) = setup_test_app().await;
        let response = app.oneshot(get("/api/nothing-here")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "not_found");
    }

    #[tokio::test]
    async fn health_reports_the_service_url() {
        let (app, _log) = setup_test_app().await;
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["attendance_service"].as_str().unwrap().starts_with("http://127.0.0.1:"));
    }
}

#[cfg(test)]
mod dashboard_tests {
    use super::test_utils::*;
    use chrono::NaiveDate;

    use crate::{
        dashboard::{
            filter_students,
            historical_csv,
            history_marks,
            lecture_type_options,
            load_admin_overview,
            load_history_filters,
            split_defaulters,
            sub_batch_numbers,
            ClientError,
            DefaulterThreshold,
            GatewayClient,
        },
        dto::{ HistoryQuery, LoginRequest, MarkAttendanceRequest, ReportQuery, SessionQuery },
        models::{ LectureType, Mark },
        session::Role,
    };

    async fn logged_in(role: Role, username: &str) -> (GatewayClient, StubLog) {
        let (url, log) = spawn_gateway().await;
        let mut client = GatewayClient::new(url).unwrap();
        client.login(role, &LoginRequest::new(username, "secret")).await.unwrap();
        (client, log)
    }

    #[tokio::test]
    async fn hod_login_starts_a_session_with_department() {
        let (url, _log) = spawn_gateway().await;
        let mut client = GatewayClient::new(url).unwrap();

        let user = client.login(Role::Hod, &LoginRequest::new("asha", "secret")).await.unwrap();
        assert_eq!(user.name, "Asha Rao");
        assert_eq!(user.dept_code.as_deref(), Some("CSE"));
        assert_eq!(client.session().role(), Some(Role::Hod));

        client.logout().unwrap();
        assert!(client.session().current().is_none());
    }

    #[tokio::test]
    async fn failed_login_surfaces_service_message() {
        let (url, _log) = spawn_gateway().await;
        let mut client = GatewayClient::new(url).unwrap();

        let err = client.login(Role::Admin, &LoginRequest::new("admin", "wrong")).await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(!client.session().is_active());
    }

    #[tokio::test]
    async fn session_cookie_rides_along_after_login() {
        let (client, log) = logged_in(Role::Admin, "admin").await;
        client.batches().await.unwrap();
        assert_eq!(log.last().cookie.as_deref(), Some("session=abc123"));
    }

    #[tokio::test]
    async fn admin_overview_loads_everything() {
        let (client, _log) = logged_in(Role::Admin, "admin").await;
        let overview = load_admin_overview(&client).await.unwrap();
        assert_eq!(overview.batches.len(), 2);
        assert_eq!(overview.staff[0].full_name, "K. Patil");
        assert_eq!(overview.subjects[0].subject_code, "CS301");
        assert_eq!(overview.assignments[0].lecture_type, LectureType::Theory);
    }

    #[tokio::test]
    async fn admin_overview_fails_as_a_whole() {
        let (client, _log) = logged_in(Role::Admin, "broken").await;
        let err = load_admin_overview(&client).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn staff_history_filters_come_from_assignments() {
        let (client, _log) = logged_in(Role::Staff, "kp").await;
        let filters = load_history_filters(&client).await.unwrap();
        assert_eq!(filters.batches.len(), 1);
        assert_eq!(filters.batches[0].name, "CSE 2");
        assert!(filters.subjects.is_empty());

        let assignments = client.staff_assignments().await.unwrap();
        assert_eq!(
            lecture_type_options(&assignments, 1, 7),
            vec![LectureType::Theory, LectureType::Practical]
        );
        assert_eq!(sub_batch_numbers(&assignments, 1, 7, &LectureType::Practical), vec![1, 2]);
    }

    #[tokio::test]
    async fn hod_history_filters_use_hod_sources() {
        let (client, log) = logged_in(Role::Hod, "asha").await;
        let filters = load_history_filters(&client).await.unwrap();
        assert_eq!(filters.batches[0].name, "CSE 2 (2024-25 Sem 3)");
        assert_eq!(filters.subjects[0].name, "Databases (CS301)");
        assert!(log.requests().iter().any(|r| r.path == "/hod/subjects"));
    }

    #[tokio::test]
    async fn history_filters_need_a_session() {
        let (url, _log) = spawn_gateway().await;
        let client = GatewayClient::new(url).unwrap();
        assert!(matches!(load_history_filters(&client).await, Err(ClientError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn report_rows_split_at_threshold() {
        let (client, _log) = logged_in(Role::Admin, "admin").await;
        let rows = client
            .admin_attendance_report(&ReportQuery {
                batch_id: 1,
                subject_id: 7,
                lecture_type: LectureType::Theory,
            }).await
            .unwrap();

        let (low, ok) = split_defaulters(&rows, DefaulterThreshold::default());
        assert_eq!(low.iter().map(|r| r.roll_no.as_str()).collect::<Vec<_>>(), vec!["CS02"]);
        assert_eq!(ok.len(), 2);
    }

    #[tokio::test]
    async fn historical_data_exports_filtered_students() {
        let (client, _log) = logged_in(Role::Admin, "admin").await;
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let data = client
            .historical_attendance(&HistoryQuery::recent(1, 7, LectureType::Theory, today)).await
            .unwrap();

        let shown = filter_students(&data.students, "asha");
        assert_eq!(history_marks(shown[0], &data.headers), vec!["P", "-"]);
        let csv = historical_csv(&data, shown).to_csv();
        assert_eq!(csv, "Roll No,Enrollment No,Name,01/03 TH,02/03 TH\nCS01,EN1,Asha,P,");
    }

    #[tokio::test]
    async fn edited_session_is_saved_in_bulk() {
        let (client, log) = logged_in(Role::Admin, "admin").await;
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let query = SessionQuery { batch_id: 1, subject_id: 7, lecture_type: LectureType::Theory, date };

        let mut records = client.attendance_session(&query).await.unwrap();
        assert_eq!(
            log.last().query.as_deref(),
            Some("batch_id=1&subject_id=7&lecture_type=TH&date=2024-03-04")
        );
        assert_eq!(records[0].status, Some(Mark::Absent));
        assert_eq!(records[1].status, Some(Mark::Absent));

        records[1].set_present(true);
        let reply = client.update_attendance_session(date, &records).await.unwrap();
        assert_eq!(reply["updated"], 2);

        let seen = log.last();
        assert_eq!(seen.path, "/admin/attendance/session");
        let sent: serde_json::Value = serde_json::from_slice(&seen.body).unwrap();
        assert_eq!(sent["date"], "2024-03-04");
        assert_eq!(sent["updates"][0], serde_json::json!({ "student_id": 1, "status": "absent", "assignment_id": 12 }));
        assert_eq!(sent["updates"][1]["status"], "present");
    }

    #[tokio::test]
    async fn session_edits_need_a_session() {
        let (url, log) = spawn_gateway().await;
        let client = GatewayClient::new(url).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert!(matches!(
            client.update_attendance_session(date, &[]).await,
            Err(ClientError::NotLoggedIn)
        ));
        assert_eq!(log.count(), 0);
    }

    #[tokio::test]
    async fn attendance_submission_is_validated_before_sending() {
        let (client, log) = logged_in(Role::Staff, "kp").await;
        let before = log.count();

        let practical = MarkAttendanceRequest::new(7, LectureType::Practical, "cs01, cs02");
        assert!(matches!(client.mark_attendance(&practical).await, Err(ClientError::Validation(_))));
        assert_eq!(log.count(), before);

        let reply = client.mark_attendance(&practical.with_batch_number(1)).await.unwrap();
        assert_eq!(reply["message"], "Attendance recorded");

        let sent: serde_json::Value = serde_json::from_slice(&log.last().body).unwrap();
        assert_eq!(sent["absent_rolls"], serde_json::json!(["CS01", "CS02"]));
        assert_eq!(sent["lecture_type"], "PR");
    }
}
