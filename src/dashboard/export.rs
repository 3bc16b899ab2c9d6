use axum::{
    http::header::{ CONTENT_DISPOSITION, CONTENT_TYPE },
    response::{ IntoResponse, Response },
};

use crate::{
    dashboard::views::MissingMark,
    models::{ AttendanceReportRow, HistoricalData, HistoricalStudent },
};

/// A header row plus data rows, serialized as RFC 4180 CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(header: Vec<String>) -> Self {
        Self { header, rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> String {
        std::iter
            ::once(&self.header)
            .chain(self.rows.iter())
            .map(|row| row.iter().map(|field| csv_field(field)).collect::<Vec<_>>().join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Quote a field when it holds a comma, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// History grid of the displayed students, one column per session.
/// Sessions with no mark export as empty cells.
pub fn historical_csv<'a>(
    data: &HistoricalData,
    students: impl IntoIterator<Item = &'a HistoricalStudent>
) -> CsvTable {
    let mut header = vec!["Roll No".to_string(), "Enrollment No".to_string(), "Name".to_string()];
    header.extend(data.headers.iter().map(|h| h.label.clone()));

    let mut table = CsvTable::new(header);
    for student in students {
        let mut row = vec![student.roll_no.clone(), student.enrollment_no.clone(), student.name.clone()];
        row.extend(
            data.headers.iter().map(|h| MissingMark::Blank.render(student.mark(h)).to_string())
        );
        table.push_row(row);
    }
    table
}

pub fn report_csv<'a>(rows: impl IntoIterator<Item = &'a AttendanceReportRow>) -> CsvTable {
    let header = ["Roll No", "Name", "Batch", "Attended", "Total", "Percentage"]
        .map(String::from)
        .to_vec();

    let mut table = CsvTable::new(header);
    for row in rows {
        table.push_row(
            vec![
                row.roll_no.clone(),
                row.name.clone(),
                row.batch_number.map(|n| n.to_string()).unwrap_or_default(),
                row.attended_lectures.to_string(),
                row.total_lectures.to_string(),
                format!("{:.2}", row.percentage)
            ]
        );
    }
    table
}

/// A CSV file ready to be sent as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

impl CsvExport {
    pub fn new(filename: impl Into<String>, table: &CsvTable) -> Self {
        Self { filename: filename.into(), contents: table.to_csv() }
    }

    pub fn historical(subject_id: i64, batch_id: i64, table: &CsvTable) -> Self {
        Self::new(format!("historical_attendance_{}_{}.csv", subject_id, batch_id), table)
    }
}

impl IntoResponse for CsvExport {
    fn into_response(self) -> Response {
        (
            [
                (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", self.filename)),
            ],
            self.contents,
        ).into_response()
    }
}
