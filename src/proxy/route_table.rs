use axum::http::Method;

/// What to do with the inbound query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPolicy {
    Drop,
    ForwardAll,
    /// Only the listed keys are forwarded, in the listed order. Missing or
    /// empty `required` keys are rejected locally with a 400.
    Select {
        required: &'static [&'static str],
        optional: &'static [&'static str],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    Empty,
    Json,
    /// Raw bytes and the inbound content-type (boundary included) are passed
    /// through untouched.
    Multipart,
}

/// Shape a successful upstream body must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Any,
    Object,
    Array,
}

impl ResponseShape {
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            ResponseShape::Any => true,
            ResponseShape::Object => value.is_object(),
            ResponseShape::Array => value.is_array(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ResponseShape::Any => "any JSON value",
            ResponseShape::Object => "an object",
            ResponseShape::Array => "an array",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub name: &'static str,
    pub method: Method,
    /// Inbound axum path template.
    pub path: &'static str,
    /// Attendance Service path template, using the same `{param}` names.
    pub upstream: &'static str,
    /// Tried once more when `upstream` answers 401 or 403.
    pub fallback_upstream: Option<&'static str>,
    pub query: QueryPolicy,
    pub body: BodyPolicy,
    pub relay_set_cookie: bool,
    pub response_shape: ResponseShape,
}

impl RouteSpec {
    fn new(name: &'static str, method: Method, path: &'static str, upstream: &'static str) -> Self {
        Self {
            name,
            method,
            path,
            upstream,
            fallback_upstream: None,
            query: QueryPolicy::Drop,
            body: BodyPolicy::Empty,
            relay_set_cookie: false,
            response_shape: ResponseShape::Any,
        }
    }

    fn get(name: &'static str, path: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Method::GET, path, upstream)
    }

    fn delete(name: &'static str, path: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Method::DELETE, path, upstream)
    }

    fn post_json(name: &'static str, path: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Method::POST, path, upstream).body(BodyPolicy::Json)
    }

    fn put_json(name: &'static str, path: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Method::PUT, path, upstream).body(BodyPolicy::Json)
    }

    fn post_multipart(name: &'static str, path: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Method::POST, path, upstream).body(BodyPolicy::Multipart)
    }

    fn body(mut self, body: BodyPolicy) -> Self {
        self.body = body;
        self
    }

    fn query(mut self, query: QueryPolicy) -> Self {
        self.query = query;
        self
    }

    fn shape(mut self, shape: ResponseShape) -> Self {
        self.response_shape = shape;
        self
    }

    fn fallback(mut self, upstream: &'static str) -> Self {
        self.fallback_upstream = Some(upstream);
        self
    }

    fn relay_set_cookie(mut self) -> Self {
        self.relay_set_cookie = true;
        self
    }

    /// Names of the `{param}` segments in the inbound template.
    pub fn path_params(&self) -> Vec<&'static str> {
        template_params(self.path)
    }
}

pub fn template_params(template: &'static str) -> Vec<&'static str> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
        .collect()
}

/// Defaulter rows for one batch. Also backs the CSV export.
pub fn staff_defaulters() -> RouteSpec {
    RouteSpec::get("staff_defaulters", "/api/staff/defaulters", "/staff/attendance-report")
        .query(QueryPolicy::Select {
            required: &["batch_id"],
            optional: &["threshold"],
        })
        .shape(ResponseShape::Array)
}

/// Every route the gateway serves.
pub fn routes() -> Vec<RouteSpec> {
    use QueryPolicy::{ ForwardAll, Select };
    use ResponseShape::{ Array, Object };

    vec![
        // Sessions
        RouteSpec::post_json("admin_login", "/api/admin/login", "/admin/login").relay_set_cookie(),
        RouteSpec::post_json("hod_login", "/api/hod/login", "/hod/login").relay_set_cookie(),
        RouteSpec::post_json("staff_login", "/api/staff/login", "/staff/login").relay_set_cookie(),

        // Batches and their students
        RouteSpec::get("list_batches", "/api/admin/batches", "/admin/batches").shape(Array),
        RouteSpec::post_multipart("create_batch", "/api/admin/batches", "/admin/batches"),
        RouteSpec::get("get_batch", "/api/admin/batches/{id}", "/admin/batches/{id}").shape(Object),
        RouteSpec::delete("delete_batch", "/api/admin/batches/{id}", "/admin/batches/{id}"),
        RouteSpec::post_json(
            "add_batch_student",
            "/api/admin/batches/{id}/students",
            "/admin/batches/{id}/students"
        ),
        RouteSpec::delete(
            "remove_batch_student_by_body",
            "/api/admin/batches/{id}/students",
            "/admin/batches/{id}/students"
        ).body(BodyPolicy::Json),
        RouteSpec::delete(
            "remove_batch_student",
            "/api/admin/batches/{id}/students/{student_id}",
            "/admin/batches/{id}/students/{student_id}"
        ),
        RouteSpec::get(
            "batches_by_department",
            "/api/admin/batches-by-department/{dept_code}",
            "/admin/batches-by-department/{dept_code}"
        ).shape(Array),
        RouteSpec::post_multipart(
            "upload_students_csv",
            "/api/admin/students/upload_csv",
            "/admin/students/upload_csv"
        ),

        // Departments
        RouteSpec::get("list_departments", "/api/admin/departments", "/admin/departments"),
        RouteSpec::post_json("create_department", "/api/admin/departments", "/admin/departments"),
        RouteSpec::put_json(
            "update_department",
            "/api/admin/departments/{dept_code}",
            "/admin/departments/{dept_code}"
        ),
        RouteSpec::delete(
            "delete_department",
            "/api/admin/departments/{dept_code}",
            "/admin/departments/{dept_code}"
        ),

        // Subjects
        RouteSpec::get("list_subjects", "/api/admin/subjects", "/admin/subjects"),
        RouteSpec::post_json("create_subject", "/api/admin/subjects", "/admin/subjects"),
        RouteSpec::put_json("update_subject", "/api/admin/subjects/{id}", "/admin/subjects/{id}"),
        RouteSpec::delete("delete_subject", "/api/admin/subjects/{id}", "/admin/subjects/{id}"),
        // Shared by admin and HOD dashboards; the service decides from the session.
        RouteSpec::get(
            "subjects_by_batch",
            "/api/admin/subjects/by-batch/{id}",
            "/admin/subjects-by-batch/{id}"
        ).fallback("/hod/subjects-by-batch/{id}"),

        // Staff and assignments
        RouteSpec::get("list_staff", "/api/admin/staff", "/admin/staff"),
        RouteSpec::post_json("create_staff", "/api/admin/staff", "/admin/staff"),
        RouteSpec::put_json("update_staff", "/api/admin/staff/{id}", "/admin/staff/{id}"),
        RouteSpec::delete("delete_staff", "/api/admin/staff/{id}", "/admin/staff/{id}"),
        RouteSpec::get("list_assignments", "/api/admin/assignments", "/admin/assignments"),
        RouteSpec::post_json("create_assignment", "/api/admin/assignments", "/admin/assignments"),
        RouteSpec::delete(
            "delete_assignment",
            "/api/admin/assignments/{id}",
            "/admin/assignments/{id}"
        ),
        RouteSpec::get(
            "staff_assignments_overview",
            "/api/admin/staff-assignments",
            "/admin/staff-assignments"
        ),

        // HOD accounts
        RouteSpec::put_json("update_hod", "/api/admin/hods/{id}", "/admin/hods/{id}"),
        RouteSpec::delete("delete_hod", "/api/admin/hods/{id}", "/admin/hods/{id}"),

        // Reports
        RouteSpec::get("admin_attendance_report", "/api/admin/attendance-report", "/admin/attendance-report")
            .query(Select {
                required: &["batch_id", "subject_id", "lecture_type"],
                optional: &[],
            })
            .shape(Array),
        RouteSpec::get(
            "historical_attendance",
            "/api/historical-attendance",
            "/admin/historical-attendance"
        )
            .query(ForwardAll)
            .shape(Object),
        RouteSpec::get(
            "admin_historical_attendance",
            "/api/admin/historical-attendance",
            "/admin/historical-attendance"
        )
            .query(ForwardAll)
            .shape(Object),
        RouteSpec::get(
            "attendance_session",
            "/api/admin/attendance/session",
            "/admin/attendance/session"
        )
            .query(ForwardAll)
            .shape(Array),
        RouteSpec::post_json(
            "update_attendance_session",
            "/api/admin/attendance/session",
            "/admin/attendance/session"
        ),

        // HOD dashboard
        RouteSpec::get("hod_batches", "/api/hod/batches", "/hod/batches"),
        RouteSpec::get("hod_subjects", "/api/hod/subjects", "/hod/subjects"),
        RouteSpec::post_json("hod_create_subject", "/api/hod/subjects", "/hod/subjects"),
        RouteSpec::put_json("hod_update_subject", "/api/hod/subjects/{id}", "/hod/subjects/{id}"),
        RouteSpec::get("hod_staff", "/api/hod/staff", "/hod/staff"),
        RouteSpec::get("hod_assignments", "/api/hod/assignments", "/hod/assignments"),
        RouteSpec::post_json("hod_create_assignment", "/api/hod/assignments", "/hod/assignments"),
        RouteSpec::delete(
            "hod_delete_assignment",
            "/api/hod/assignments/{id}",
            "/hod/assignments/{id}"
        ),

        // Staff dashboard
        RouteSpec::get("staff_assignments", "/api/staff/assignments", "/staff/assignments"),
        RouteSpec::get(
            "staff_subjects_by_batch",
            "/api/staff/subjects/by-batch/{id}",
            "/staff/subjects-by-batch/{id}"
        ).shape(Array),
        RouteSpec::post_json("mark_attendance", "/api/staff/attendance", "/staff/attendance"),
        RouteSpec::post_json(
            "validate_absentees",
            "/api/staff/attendance/validate",
            "/staff/attendance/validate-absentees"
        ),
        staff_defaulters(),
        RouteSpec::get("staff_reports", "/api/staff/reports", "/staff/attendance-report").query(
            ForwardAll
        ),
        RouteSpec::get("staff_roster", "/api/staff/roster/{id}", "/staff/roster/{id}").query(
            ForwardAll
        ),
        RouteSpec::get(
            "staff_batch_students",
            "/api/staff/batches/{id}/students",
            "/staff/batches/{id}/students"
        )
    ]
}
