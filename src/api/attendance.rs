//! Attendance record endpoints. Records can be created and deleted but not edited.

use axum::{Json, extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{ApiJson, ApiPath, required};
use crate::AppState;
use crate::error::{Error, Result};
use crate::models::AttendanceEntry;

#[derive(Debug, Deserialize)]
pub struct AttendancePayload {
    /// Primary key of the student, not their natural id.
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    /// Must be `YYYY-MM-DD`.
    pub date: Option<String>,
    pub status: Option<String>,
}

/// GET /api/attendance
pub async fn list_attendance(State(state): State<AppState>) -> Result<Json<Vec<AttendanceEntry>>> {
    let entries = state
        .with_manager(|manager| manager.get_attendance())
        .await?;
    Ok(Json(entries))
}

/// POST /api/attendance
pub async fn create_attendance(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AttendancePayload>,
) -> Result<(StatusCode, Json<AttendanceEntry>)> {
    let student_id = required(payload.student_id, "student_id")?;
    let subject_id = required(payload.subject_id, "subject_id")?;
    let date = required(payload.date, "date")?;
    let status = required(payload.status, "status")?;

    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("date {date:?} is not in YYYY-MM-DD format")))?;

    let entry = state
        .with_manager(move |manager| {
            manager.create_attendance(student_id, subject_id, date, &status)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/attendance/:id
pub async fn delete_attendance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode> {
    state
        .with_manager(move |manager| manager.delete_attendance(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
