use serde::{ Deserialize, Serialize };
use tracing::info;

/// Which dashboard a user signed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hod,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hod => "hod",
            Role::Staff => "staff",
        }
    }

    /// Gateway route that signs this role in.
    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Admin => "/api/admin/login",
            Role::Hod => "/api/hod/login",
            Role::Staff => "/api/staff/login",
        }
    }

    /// Gateway route listing the subjects taught in a batch, as seen by this role.
    pub fn subjects_by_batch_path(&self, batch_id: i64) -> String {
        match self {
            Role::Admin | Role::Hod => format!("/api/admin/subjects/by-batch/{}", batch_id),
            Role::Staff => format!("/api/staff/subjects/by-batch/{}", batch_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: String,
    pub role: Role,
    pub dept_code: Option<String>,
}

impl AuthUser {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            dept_code: None,
        }
    }

    pub fn with_dept_code(mut self, dept_code: impl Into<String>) -> Self {
        self.dept_code = Some(dept_code.into());
        self
    }
}

/// Who is signed in on this client, if anyone.
///
/// Holds display data only. The session cookie lives in the HTTP client's
/// cookie store and is never read here.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<AuthUser>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, user: AuthUser) {
        info!(role = user.role.as_str(), name = %user.name, "session started");
        self.user = Some(user);
    }

    pub fn clear(&mut self) {
        if let Some(user) = self.user.take() {
            info!(role = user.role.as_str(), name = %user.name, "session cleared");
        }
    }

    pub fn current(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn is_active(&self) -> bool {
        self.user.is_some()
    }
}
