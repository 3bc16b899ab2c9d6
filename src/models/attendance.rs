use std::collections::HashMap;

use serde::{ Deserialize, Serialize };

/// One student's line in a percentage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceReportRow {
    #[serde(default)]
    pub student_id: Option<i64>,
    pub roll_no: String,
    pub name: String,
    #[serde(default)]
    pub batch_number: Option<i32>,
    #[serde(default, alias = "lectures_attended")]
    pub attended_lectures: u32,
    #[serde(default, alias = "lectures_held")]
    pub total_lectures: u32,
    #[serde(alias = "attendance_percentage")]
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    #[serde(rename = "P", alias = "present")]
    Present,
    #[serde(rename = "A", alias = "absent")]
    Absent,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Present => "P",
            Mark::Absent => "A",
        }
    }
}

/// Status spelling the session-edit endpoints use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Present,
    Absent,
}

impl From<Mark> for SessionStatus {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Present => SessionStatus::Present,
            Mark::Absent => SessionStatus::Absent,
        }
    }
}

/// One student's line of a recorded lecture session, as the edit form
/// shows it. `status` is empty when the service has no mark for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub student_id: i64,
    #[serde(default)]
    pub roll_no: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub assignment_id: Option<i64>,
    #[serde(default)]
    pub status: Option<Mark>,
}

impl SessionRecord {
    pub fn set_present(&mut self, present: bool) {
        self.status = Some(if present { Mark::Present } else { Mark::Absent });
    }

    pub fn is_present(&self) -> bool {
        self.status == Some(Mark::Present)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryHeader {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStudent {
    pub id: i64,
    pub roll_no: String,
    #[serde(default)]
    pub enrollment_no: String,
    pub name: String,
    #[serde(default)]
    pub attendance: HashMap<String, Mark>,
}

impl HistoricalStudent {
    pub fn mark(&self, header: &HistoryHeader) -> Option<Mark> {
        self.attendance.get(&header.id).copied()
    }
}

/// Spreadsheet-style history: one column per lecture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HistoricalData {
    pub headers: Vec<HistoryHeader>,
    pub students: Vec<HistoricalStudent>,
}
