//! Pure derivations the dashboards run over fetched collections.

use std::{ collections::{ BTreeSet, HashSet }, hash::Hash };

use serde::{ Deserialize, Serialize };

use crate::models::{
    AttendanceReportRow,
    HistoricalStudent,
    HistoryHeader,
    LectureType,
    Mark,
    StaffAssignment,
    StaffAssignments,
    Student,
};

pub use crate::dto::attendance_dtos::parse_absent_rolls;

/// Keep the first item for every key, in first-seen order.
pub fn unique_by_key<'a, T, K, F>(items: impl IntoIterator<Item = &'a T>, key: F) -> Vec<&'a T>
    where T: 'a, K: Eq + Hash, F: Fn(&T) -> K
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(*item)))
        .collect()
}

/// One assignment per batch. Assignments without a batch are skipped.
pub fn unique_batches(assignments: &StaffAssignments) -> Vec<&StaffAssignment> {
    unique_by_key(
        assignments.iter().filter(|a| a.batch_id.is_some()),
        |a| a.batch_id
    )
}

fn matching<'a>(
    assignments: &'a StaffAssignments,
    batch_id: i64,
    subject_id: i64
) -> impl Iterator<Item = &'a StaffAssignment> {
    assignments
        .iter()
        .filter(move |a| a.subject_id == subject_id && a.batch_id.map_or(true, |id| id == batch_id))
}

/// Lecture types this staff member teaches for the batch and subject.
pub fn lecture_type_options(
    assignments: &StaffAssignments,
    batch_id: i64,
    subject_id: i64
) -> Vec<LectureType> {
    let mut options: Vec<LectureType> = Vec::new();
    for code in matching(assignments, batch_id, subject_id).flat_map(|a| a.lecture_types.keys()) {
        let lecture_type = LectureType::from(code.as_str());
        if !options.contains(&lecture_type) {
            options.push(lecture_type);
        }
    }
    options
}

/// Sub-batches assigned for a practical or tutorial, ascending. Theory
/// lectures never have any.
pub fn sub_batch_numbers(
    assignments: &StaffAssignments,
    batch_id: i64,
    subject_id: i64,
    lecture_type: &LectureType
) -> Vec<i32> {
    if !requires_sub_batch(lecture_type) {
        return Vec::new();
    }

    matching(assignments, batch_id, subject_id)
        .filter_map(|a| {
            a.lecture_types
                .iter()
                .find(|(code, _)| LectureType::from(code.as_str()) == *lecture_type)
                .map(|(_, entries)| entries)
        })
        .flatten()
        .filter_map(|entry| entry.batch_number())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn requires_sub_batch(lecture_type: &LectureType) -> bool {
    lecture_type.uses_sub_batches()
}

/// Attendance percentage below which a student is a defaulter.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DefaulterThreshold(f64);

impl DefaulterThreshold {
    pub const DEFAULT: f64 = 75.0;

    pub fn new(percentage: f64) -> Option<Self> {
        (0.0..=100.0).contains(&percentage).then_some(Self(percentage))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for DefaulterThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for DefaulterThreshold {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("threshold {} is outside 0..=100", value))
    }
}

impl From<DefaulterThreshold> for f64 {
    fn from(threshold: DefaulterThreshold) -> f64 {
        threshold.0
    }
}

pub fn is_defaulter(row: &AttendanceReportRow, threshold: DefaulterThreshold) -> bool {
    row.percentage < threshold.value()
}

pub fn defaulters(
    rows: &[AttendanceReportRow],
    threshold: DefaulterThreshold
) -> Vec<&AttendanceReportRow> {
    rows.iter()
        .filter(|row| is_defaulter(row, threshold))
        .collect()
}

/// `(defaulters, regular)`, each in input order.
pub fn split_defaulters(
    rows: &[AttendanceReportRow],
    threshold: DefaulterThreshold
) -> (Vec<&AttendanceReportRow>, Vec<&AttendanceReportRow>) {
    rows.iter().partition(|row| is_defaulter(row, threshold))
}

/// Records a search box can match: name, roll number and enrollment number.
pub trait Searchable {
    fn search_fields(&self) -> [&str; 3];
}

impl Searchable for Student {
    fn search_fields(&self) -> [&str; 3] {
        [self.name.as_str(), self.roll_no.as_str(), self.enrollment_no.as_str()]
    }
}

impl Searchable for HistoricalStudent {
    fn search_fields(&self) -> [&str; 3] {
        [self.name.as_str(), self.roll_no.as_str(), self.enrollment_no.as_str()]
    }
}

impl Searchable for AttendanceReportRow {
    fn search_fields(&self) -> [&str; 3] {
        [self.name.as_str(), self.roll_no.as_str(), ""]
    }
}

pub fn filter_students<'a, T: Searchable>(students: &'a [T], term: &str) -> Vec<&'a T> {
    let term = term.trim().to_lowercase();
    students
        .iter()
        .filter(|student| {
            term.is_empty() ||
                student
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

/// How a view renders a session with no recorded mark for a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMark {
    /// Edit forms start unrecorded students as absent.
    Absent,
    Dash,
    Blank,
}

impl MissingMark {
    /// The mark a view starts from. Only edit forms invent one.
    pub fn prefill(&self, mark: Option<Mark>) -> Option<Mark> {
        match self {
            MissingMark::Absent => mark.or(Some(Mark::Absent)),
            MissingMark::Dash | MissingMark::Blank => mark,
        }
    }

    pub fn render(&self, mark: Option<Mark>) -> &'static str {
        match (self.prefill(mark), self) {
            (Some(mark), _) => mark.as_str(),
            (None, MissingMark::Dash) => "-",
            (None, _) => "",
        }
    }
}

/// A student's marks across the history grid, one cell per session header.
pub fn history_marks(student: &HistoricalStudent, headers: &[HistoryHeader]) -> Vec<&'static str> {
    headers
        .iter()
        .map(|header| MissingMark::Dash.render(student.mark(header)))
        .collect()
}
