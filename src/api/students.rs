//! Student CRUD endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::{ApiJson, ApiPath, required};
use crate::AppState;
use crate::error::Result;
use crate::models::Student;

/// Request body for creating or replacing a student. Every field is optional here so that a
/// missing one can be reported by name.
#[derive(Debug, Deserialize)]
pub struct StudentPayload {
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

struct StudentFields {
    student_id: String,
    name: String,
    email: Option<String>,
}

impl StudentPayload {
    fn validate(self) -> Result<StudentFields> {
        Ok(StudentFields {
            student_id: required(self.student_id, "student_id")?,
            name: required(self.name, "name")?,
            email: self.email.filter(|email| !email.is_empty()),
        })
    }
}

/// GET /api/students
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>> {
    let students = state.with_manager(|manager| manager.get_roster()).await?;
    Ok(Json(students))
}

/// POST /api/students
pub async fn create_student(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> Result<(StatusCode, Json<Student>)> {
    let fields = payload.validate()?;

    let student = state
        .with_manager(move |manager| {
            manager.create_student(&fields.student_id, &fields.name, fields.email.as_deref())
        })
        .await?;

    tracing::info!(id = student.id, student_id = %student.student_id, "student created");

    Ok((StatusCode::CREATED, Json(student)))
}

/// PUT /api/students/:id
pub async fn update_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> Result<Json<Student>> {
    let fields = payload.validate()?;

    let student = state
        .with_manager(move |manager| {
            manager.update_student(
                id,
                &fields.student_id,
                &fields.name,
                fields.email.as_deref(),
            )
        })
        .await?;

    Ok(Json(student))
}

/// DELETE /api/students/:id
pub async fn delete_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode> {
    state
        .with_manager(move |manager| manager.delete_student(id))
        .await?;

    tracing::info!(id, "student deleted");

    Ok(StatusCode::NO_CONTENT)
}
