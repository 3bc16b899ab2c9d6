use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{ Deserialize, Serialize };
use validator::{ Validate, ValidationError };

use crate::models::{ LectureType, Mark, SessionRecord, SessionStatus };

lazy_static! {
    static ref ROLL_SEPARATOR: Regex = Regex::new(r"[\s,]+").unwrap();
}

/// Split free-form absentee input ("21, 22 23\n24") into upper-cased roll numbers.
pub fn parse_absent_rolls(input: &str) -> Vec<String> {
    ROLL_SEPARATOR.split(input)
        .filter(|roll| !roll.is_empty())
        .map(|roll| roll.to_uppercase())
        .collect()
}

/// Body of a mark-attendance or validate-absentees submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_sub_batch", skip_on_field_errors = false))]
pub struct MarkAttendanceRequest {
    #[validate(range(min = 1, message = "Subject is required"))]
    pub subject_id: i64,
    pub lecture_type: LectureType,
    pub batch_number: Option<i32>,
    pub absent_rolls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classroom_name: Option<String>,
}

fn validate_sub_batch(request: &MarkAttendanceRequest) -> Result<(), ValidationError> {
    if request.lecture_type.uses_sub_batches() && request.batch_number.is_none() {
        let mut err = ValidationError::new("sub_batch_required");
        err.message = Some("Please select a batch for this lecture type.".into());
        return Err(err);
    }
    Ok(())
}

impl MarkAttendanceRequest {
    pub fn new(subject_id: i64, lecture_type: LectureType, absent_input: &str) -> Self {
        Self {
            subject_id,
            lecture_type,
            batch_number: None,
            absent_rolls: parse_absent_rolls(absent_input),
            classroom_name: None,
        }
    }

    pub fn with_batch_number(mut self, batch_number: i32) -> Self {
        self.batch_number = Some(batch_number);
        self
    }

    pub fn with_classroom(mut self, classroom_name: impl Into<String>) -> Self {
        self.classroom_name = Some(classroom_name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub student_id: i64,
    pub status: SessionStatus,
    pub assignment_id: Option<i64>,
}

/// Bulk rewrite of one lecture session's marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SessionUpdateRequest {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "No attendance recorded for this session."))]
    pub updates: Vec<SessionUpdate>,
}

impl SessionUpdateRequest {
    /// Unmarked records are saved as absent.
    pub fn from_records(date: NaiveDate, records: &[SessionRecord]) -> Self {
        let updates = records
            .iter()
            .map(|record| SessionUpdate {
                student_id: record.student_id,
                status: record.status.unwrap_or(Mark::Absent).into(),
                assignment_id: record.assignment_id,
            })
            .collect();
        Self { date, updates }
    }
}
