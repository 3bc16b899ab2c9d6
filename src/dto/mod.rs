pub mod attendance_dtos;
pub mod authentication_dtos;
pub mod report_dtos;

pub use attendance_dtos::{ MarkAttendanceRequest, SessionUpdate, SessionUpdateRequest };
pub use authentication_dtos::{ LoginRequest, LoginResponse };
pub use report_dtos::{ HistoryQuery, ReportQuery, SessionQuery };
