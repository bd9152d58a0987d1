//! Text tables for the command line and the HTML pages.

use crate::models::{AttendanceEntry, DashboardStats, Student, Subject};
use tabled::{Table, Tabled, settings::Style};

/// Placeholder for missing optional values and for names of deleted students or subjects.
const NONE: &str = "-";

#[derive(Tabled)]
struct StudentRow {
    id: i32,
    student_id: String,
    name: String,
    email: String,
    created_at: String,
}

#[derive(Tabled)]
struct SubjectRow {
    id: i32,
    code: String,
    name: String,
    created_at: String,
}

#[derive(Tabled)]
struct AttendanceRow {
    id: i32,
    student: String,
    subject: String,
    date: String,
    status: String,
}

#[derive(Tabled)]
struct StatRow {
    statistic: &'static str,
    value: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

/// Renders the roster as a table.
pub fn students_table(students: &[Student]) -> String {
    render(
        students
            .iter()
            .map(|student| StudentRow {
                id: student.id,
                student_id: student.student_id.clone(),
                name: student.name.clone(),
                email: student.email.clone().unwrap_or_else(|| NONE.to_string()),
                created_at: student.created_at.format("%Y-%m-%d %H:%M").to_string(),
            })
            .collect(),
    )
}

/// Renders the subjects as a table.
pub fn subjects_table(subjects: &[Subject]) -> String {
    render(
        subjects
            .iter()
            .map(|subject| SubjectRow {
                id: subject.id,
                code: subject.code.clone(),
                name: subject.name.clone(),
                created_at: subject.created_at.format("%Y-%m-%d %H:%M").to_string(),
            })
            .collect(),
    )
}

/// Renders attendance records as a table, one row per record.
pub fn attendance_table(entries: &[AttendanceEntry]) -> String {
    render(
        entries
            .iter()
            .map(|entry| AttendanceRow {
                id: entry.id,
                student: entry.student_name.clone().unwrap_or_else(|| NONE.to_string()),
                subject: entry.subject_name.clone().unwrap_or_else(|| NONE.to_string()),
                date: entry.date.to_string(),
                status: entry.status.clone(),
            })
            .collect(),
    )
}

/// Renders the dashboard statistics as a two-column table.
pub fn stats_table(stats: &DashboardStats) -> String {
    render(vec![
        StatRow {
            statistic: "Students",
            value: stats.total_students.to_string(),
        },
        StatRow {
            statistic: "Subjects",
            value: stats.total_subjects.to_string(),
        },
        StatRow {
            statistic: "Attendance records",
            value: stats.total_records.to_string(),
        },
        StatRow {
            statistic: "Present",
            value: stats.present_count.to_string(),
        },
        StatRow {
            statistic: "Attendance rate",
            value: format!("{:.2}%", stats.attendance_rate),
        },
    ])
}
