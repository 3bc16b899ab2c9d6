pub mod academic;
pub mod attendance;

pub use academic::{
    Assignment,
    Batch,
    Department,
    LectureType,
    LectureTypes,
    Staff,
    StaffAssignment,
    StaffAssignments,
    Student,
    SubBatchEntry,
    Subject,
    SubjectOption,
};
pub use attendance::{
    AttendanceReportRow,
    HistoricalData,
    HistoricalStudent,
    HistoryHeader,
    Mark,
    SessionRecord,
    SessionStatus,
};
