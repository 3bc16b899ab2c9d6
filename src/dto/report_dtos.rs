use chrono::{ Duration, NaiveDate };
use serde::{ Deserialize, Serialize };
use validator::{ Validate, ValidationError };

use crate::models::LectureType;

const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Filters of the admin percentage report. All three are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReportQuery {
    #[validate(range(min = 1))]
    pub batch_id: i64,
    #[validate(range(min = 1))]
    pub subject_id: i64,
    pub lecture_type: LectureType,
}

impl ReportQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("batch_id", self.batch_id.to_string()),
            ("subject_id", self.subject_id.to_string()),
            ("lecture_type", self.lecture_type.code().to_string())
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct HistoryQuery {
    #[validate(range(min = 1))]
    pub batch_id: i64,
    #[validate(range(min = 1))]
    pub subject_id: i64,
    pub lecture_type: LectureType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_date_range(query: &HistoryQuery) -> Result<(), ValidationError> {
    if query.start_date > query.end_date {
        let mut err = ValidationError::new("date_range");
        err.message = Some("Start date must not be after end date".into());
        return Err(err);
    }
    Ok(())
}

impl HistoryQuery {
    /// The dashboard's default window: the thirty days up to `today`.
    pub fn recent(batch_id: i64, subject_id: i64, lecture_type: LectureType, today: NaiveDate) -> Self {
        Self {
            batch_id,
            subject_id,
            lecture_type,
            start_date: today - Duration::days(DEFAULT_HISTORY_DAYS),
            end_date: today,
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("subject_id", self.subject_id.to_string()),
            ("batch_id", self.batch_id.to_string()),
            ("start_date", self.start_date.format(DATE_FORMAT).to_string()),
            ("end_date", self.end_date.format(DATE_FORMAT).to_string()),
            ("lecture_type", self.lecture_type.code().to_string())
        ]
    }
}

/// Selects one recorded lecture session for editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SessionQuery {
    #[validate(range(min = 1))]
    pub batch_id: i64,
    #[validate(range(min = 1))]
    pub subject_id: i64,
    pub lecture_type: LectureType,
    pub date: NaiveDate,
}

impl SessionQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("batch_id", self.batch_id.to_string()),
            ("subject_id", self.subject_id.to_string()),
            ("lecture_type", self.lecture_type.code().to_string()),
            ("date", self.date.format(DATE_FORMAT).to_string())
        ]
    }
}
