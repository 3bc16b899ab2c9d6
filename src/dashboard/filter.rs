use std::future::Future;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{ dto::ReportQuery, models::{ AttendanceReportRow, LectureType } };

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterStage {
    Unselected,
    BatchSelected,
    SubjectSelected,
    LectureTypeSelected,
    SubBatchSelected,
    ReportLoaded,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("select a {0} first")]
    MissingSelection(&'static str),

    #[error("lecture type {0} has no sub-batches")]
    NoSubBatches(String),
}

/// Identifies one report fetch. Only the ticket of the latest fetch is
/// accepted by [`ReportFilter::finish_fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    generation: u64,
    pub query: ReportQuery,
    pub batch_number: Option<i32>,
}

/// Batch → subject → lecture type → (sub-batch) → report.
///
/// Every selection clears whatever depends on it and invalidates any fetch
/// still in flight.
#[derive(Debug, Default)]
pub struct ReportFilter {
    batch_id: Option<i64>,
    subject_id: Option<i64>,
    lecture_type: Option<LectureType>,
    sub_batch: Option<i32>,
    rows: Option<Vec<AttendanceReportRow>>,
    loading: bool,
    generation: u64,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> FilterStage {
        if self.rows.is_some() {
            FilterStage::ReportLoaded
        } else if self.sub_batch.is_some() {
            FilterStage::SubBatchSelected
        } else if self.lecture_type.is_some() {
            FilterStage::LectureTypeSelected
        } else if self.subject_id.is_some() {
            FilterStage::SubjectSelected
        } else if self.batch_id.is_some() {
            FilterStage::BatchSelected
        } else {
            FilterStage::Unselected
        }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.rows = None;
        self.loading = false;
    }

    pub fn select_batch(&mut self, batch_id: i64) {
        self.batch_id = Some(batch_id);
        self.subject_id = None;
        self.lecture_type = None;
        self.sub_batch = None;
        self.invalidate();
    }

    pub fn select_subject(&mut self, subject_id: i64) -> Result<(), FilterError> {
        if self.batch_id.is_none() {
            return Err(FilterError::MissingSelection("batch"));
        }
        self.subject_id = Some(subject_id);
        self.lecture_type = None;
        self.sub_batch = None;
        self.invalidate();
        Ok(())
    }

    pub fn select_lecture_type(&mut self, lecture_type: LectureType) -> Result<(), FilterError> {
        if self.subject_id.is_none() {
            return Err(FilterError::MissingSelection("subject"));
        }
        self.lecture_type = Some(lecture_type);
        self.sub_batch = None;
        self.invalidate();
        Ok(())
    }

    pub fn select_sub_batch(&mut self, batch_number: i32) -> Result<(), FilterError> {
        match &self.lecture_type {
            None => Err(FilterError::MissingSelection("lecture type")),
            Some(lecture_type) if !lecture_type.uses_sub_batches() => {
                Err(FilterError::NoSubBatches(lecture_type.code().to_string()))
            }
            Some(_) => {
                self.sub_batch = Some(batch_number);
                self.invalidate();
                Ok(())
            }
        }
    }

    /// True once every selection the report needs has been made.
    pub fn is_complete(&self) -> bool {
        match &self.lecture_type {
            Some(lecture_type) => !lecture_type.uses_sub_batches() || self.sub_batch.is_some(),
            None => false,
        }
    }

    /// Start a report fetch for the current selection. Any earlier ticket
    /// becomes stale.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if !self.is_complete() {
            return None;
        }
        let query = ReportQuery {
            batch_id: self.batch_id?,
            subject_id: self.subject_id?,
            lecture_type: self.lecture_type.clone()?,
        };

        self.generation += 1;
        self.loading = true;
        Some(FetchTicket {
            generation: self.generation,
            query,
            batch_number: self.sub_batch,
        })
    }

    /// Apply a finished fetch. Returns false, leaving state untouched, when
    /// the selection moved on after the ticket was issued.
    pub fn finish_fetch(&mut self, ticket: &FetchTicket, rows: Vec<AttendanceReportRow>) -> bool {
        if ticket.generation != self.generation {
            debug!(ticket = ticket.generation, current = self.generation, "dropping stale report");
            return false;
        }
        let rows = match ticket.batch_number {
            Some(number) => rows
                .into_iter()
                .filter(|row| row.batch_number.map_or(true, |n| n == number))
                .collect(),
            None => rows,
        };
        self.rows = Some(rows);
        self.loading = false;
        true
    }

    /// Give up on a failed fetch so the view stops showing a spinner.
    pub fn fail_fetch(&mut self, ticket: &FetchTicket) {
        if ticket.generation == self.generation {
            self.loading = false;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn rows(&self) -> Option<&[AttendanceReportRow]> {
        self.rows.as_deref()
    }

    pub fn batch_id(&self) -> Option<i64> {
        self.batch_id
    }

    pub fn subject_id(&self) -> Option<i64> {
        self.subject_id
    }

    pub fn lecture_type(&self) -> Option<&LectureType> {
        self.lecture_type.as_ref()
    }

    pub fn sub_batch(&self) -> Option<i32> {
        self.sub_batch
    }
}

/// Runs at most one request at a time; starting a new one aborts the last.
pub struct LatestRequest<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T> Default for LatestRequest<T> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<T: Send + 'static> LatestRequest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<F>(&mut self, request: F) where F: Future<Output = T> + Send + 'static {
        if let Some(previous) = self.handle.replace(tokio::spawn(request)) {
            if !previous.is_finished() {
                debug!("aborting superseded request");
            }
            previous.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the most recent request. `None` if nothing was started or
    /// the task was cancelled.
    pub async fn finish(&mut self) -> Option<T> {
        self.handle.take()?.await.ok()
    }
}

impl<T> Drop for LatestRequest<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
