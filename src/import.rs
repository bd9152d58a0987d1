//! Reading attendance rows out of `.xlsx` / `.xls` workbooks.
//!
//! The first worksheet is expected to have a header row naming the [`COLUMNS`]. The header is
//! checked once up front, then every following non-blank row becomes an [`ImportRow`]. Storing
//! the rows is left to [`AttendanceManager::import_rows`](crate::manager::AttendanceManager).

use crate::error::{Error, Result};
use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// File extensions accepted for upload, compared case-insensitively.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// The header names every import worksheet must contain.
pub const COLUMNS: [&str; 6] = [
    "student_id",
    "student_name",
    "subject_code",
    "subject_name",
    "date",
    "status",
];

/// One attendance entry read from a worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub student_id: String,
    pub student_name: String,
    pub subject_code: String,
    pub subject_name: String,
    pub date: NaiveDate,
    pub status: String,
}

/// What an import did to the database.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Newly inserted attendance records.
    pub processed: usize,
    pub students_created: usize,
    pub subjects_created: usize,
    /// Rows whose (student, subject, date) was already recorded.
    pub duplicates_skipped: usize,
}

/// Returns whether `file_name` has one of the [`ACCEPTED_EXTENSIONS`].
pub fn is_spreadsheet(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// Reduces an uploaded file name to a safe name for the upload folder.
///
/// Directory components are dropped, whitespace becomes `_`, and anything other than ASCII
/// letters, digits, `.`, `-` and `_` is removed. Leading dots are stripped.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// Reads the rows of the first worksheet of the workbook at `path`.
///
/// The format is picked from the file extension.
pub fn read_workbook(path: &Path) -> Result<Vec<ImportRow>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::InvalidInput("workbook has no worksheets".into()))??;

    read_rows(&range)
}

/// Positions of the [`COLUMNS`] within a worksheet's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    student_id: usize,
    student_name: usize,
    subject_code: usize,
    subject_name: usize,
    date: usize,
    status: usize,
}

impl ColumnMap {
    fn from_header(header: &[Data]) -> Result<Self> {
        let find = |name: &'static str| {
            header
                .iter()
                .position(|cell| matches!(cell, Data::String(s) if s.trim() == name))
                .ok_or(Error::MissingColumn(name))
        };

        Ok(Self {
            student_id: find("student_id")?,
            student_name: find("student_name")?,
            subject_code: find("subject_code")?,
            subject_name: find("subject_name")?,
            date: find("date")?,
            status: find("status")?,
        })
    }
}

/// Turns a worksheet into rows. An empty worksheet yields no rows.
///
/// The header is the first non-empty row, which need not be the first row of the worksheet.
pub fn read_rows(range: &Range<Data>) -> Result<Vec<ImportRow>> {
    // Zero-based worksheet row of the header.
    let header_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = ColumnMap::from_header(header)?;

    let mut imported = Vec::new();
    for (index, cells) in rows.enumerate() {
        if cells.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        // +1 for the header, +1 to count from one.
        let row = header_row + index + 2;
        imported.push(read_row(cells, &columns, row)?);
    }

    Ok(imported)
}

fn read_row(cells: &[Data], columns: &ColumnMap, row: usize) -> Result<ImportRow> {
    let text = |position: usize, name: &str| {
        cell(cells, position).and_then(cell_text).ok_or_else(|| Error::InvalidRow {
            row,
            message: format!("{name} is empty"),
        })
    };

    let date = cell(cells, columns.date)
        .ok_or_else(|| Error::InvalidRow {
            row,
            message: "date is empty".into(),
        })
        .and_then(|date| {
            cell_date(date).ok_or_else(|| Error::InvalidRow {
                row,
                message: format!("unrecognized date {date}"),
            })
        })?;

    Ok(ImportRow {
        student_id: text(columns.student_id, "student_id")?,
        student_name: text(columns.student_name, "student_name")?,
        subject_code: text(columns.subject_code, "subject_code")?,
        subject_name: text(columns.subject_name, "subject_name")?,
        date,
        status: text(columns.status, "status")?,
    })
}

/// The cell at `position`, unless it is missing or blank.
fn cell(cells: &[Data], position: usize) -> Option<&Data> {
    cells
        .get(position)
        .filter(|data| !matches!(data, Data::Empty))
}

/// Renders a cell as text. Whole floats lose their fractional part so that a student number typed
/// as `1001` reads back as `"1001"` rather than `"1001.0"`.
fn cell_text(data: &Data) -> Option<String> {
    let text = match data {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (*f as i64).to_string()
        }
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_datetime()?.date().to_string(),
        Data::Error(_) | Data::Empty => return None,
    };

    (!text.is_empty()).then_some(text)
}

fn cell_date(data: &Data) -> Option<NaiveDate> {
    match data {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::String(s) | Data::DateTimeIso(s) => parse_date(s),
        _ => None,
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses the date spellings commonly found in spreadsheets. Ambiguous slash dates are read
/// month first. A time of day, if present, is dropped.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
    {
        return Some(date);
    }

    if let Ok(date_time) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(date_time.date_naive());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|date_time| date_time.date())
}
