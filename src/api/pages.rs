//! Server-rendered pages. Each page is the shared navigation bar plus one or more text tables.

use axum::{extract::State, response::Html};
use htmlescape::encode_minimal;

use crate::AppState;
use crate::display;
use crate::error::Result;

const NAV: &str = r#"<nav>
  <a href="/">Dashboard</a> |
  <a href="/students">Students</a> |
  <a href="/subjects">Subjects</a> |
  <a href="/attendance">Attendance</a> |
  <a href="/upload">Upload</a>
</nav>"#;

const UPLOAD_FORM: &str = r#"<form action="/api/upload" method="post" enctype="multipart/form-data">
  <p>Workbook columns: student_id, student_name, subject_code, subject_name, date, status.</p>
  <input type="file" name="file" accept=".xlsx,.xls">
  <button type="submit">Upload</button>
</form>"#;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title} - Attendance</title>\n</head>\n<body>\n{NAV}\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    ))
}

fn table_page(title: &str, table: &str) -> Html<String> {
    page(title, &format!("<pre>{}</pre>", encode_minimal(table)))
}

/// GET /
pub async fn dashboard_page(State(state): State<AppState>) -> Result<Html<String>> {
    let stats = state
        .with_manager(|manager| manager.dashboard_stats())
        .await?;

    Ok(table_page("Dashboard", &display::stats_table(&stats)))
}

/// GET /students
pub async fn students_page(State(state): State<AppState>) -> Result<Html<String>> {
    let students = state.with_manager(|manager| manager.get_roster()).await?;

    Ok(table_page("Students", &display::students_table(&students)))
}

/// GET /subjects
pub async fn subjects_page(State(state): State<AppState>) -> Result<Html<String>> {
    let subjects = state.with_manager(|manager| manager.get_subjects()).await?;

    Ok(table_page("Subjects", &display::subjects_table(&subjects)))
}

/// GET /attendance
pub async fn attendance_page(State(state): State<AppState>) -> Result<Html<String>> {
    let entries = state
        .with_manager(|manager| manager.get_attendance())
        .await?;

    Ok(table_page("Attendance", &display::attendance_table(&entries)))
}

/// GET /upload
pub async fn upload_page() -> Html<String> {
    page("Upload", UPLOAD_FORM)
}
