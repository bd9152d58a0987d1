use crate::schema::{attendance_records, students, subjects};
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::Serialize;

/// The status string counted as attended by the summaries.
pub const PRESENT: &str = "Present";

/// The status string counted as absent by the summaries.
pub const ABSENT: &str = "Absent";

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Student {
    pub id: i32,
    /// The natural identifier of the student, e.g. a student number.
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = students)]
pub struct NewStudent<'a> {
    pub student_id: &'a str,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

/// A full replacement of a student's editable fields.
///
/// A `None` email clears the stored email rather than leaving it untouched.
#[derive(AsChangeset)]
#[diesel(table_name = students)]
#[diesel(treat_none_as_null = true)]
pub struct StudentChanges<'a> {
    pub student_id: &'a str,
    pub name: &'a str,
    pub email: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Subject {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = subjects)]
pub struct NewSubject<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = subjects)]
pub struct SubjectChanges<'a> {
    pub code: &'a str,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AttendanceRecord {
    pub id: i32,
    pub student_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = attendance_records)]
pub struct NewAttendanceRecord<'a> {
    pub student_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
}

/// An attendance record joined with the display names of the student and subject it refers to.
///
/// The names are `None` when the referenced student or subject has since been deleted.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub id: i32,
    pub student_name: Option<String>,
    pub subject_name: Option<String>,
    pub date: NaiveDate,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl AttendanceEntry {
    pub fn new(
        record: AttendanceRecord,
        student_name: Option<String>,
        subject_name: Option<String>,
    ) -> Self {
        Self {
            id: record.id,
            student_name,
            subject_name,
            date: record.date,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

/// Aggregate counts over every attendance record.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AttendanceSummary {
    pub total_records: usize,
    pub present_count: usize,
    pub absent_count: usize,
    pub attendance_rate: f64,
}

/// The headline numbers shown on the dashboard.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_subjects: usize,
    pub total_records: usize,
    pub present_count: usize,
    pub attendance_rate: f64,
}

/// Percentage of `present` over `total`, rounded to two decimals. Zero when there are no records.
pub fn attendance_rate(present: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let rate = present as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
