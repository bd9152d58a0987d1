//! Subject CRUD endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::{ApiJson, ApiPath, required};
use crate::AppState;
use crate::error::Result;
use crate::models::Subject;

#[derive(Debug, Deserialize)]
pub struct SubjectPayload {
    pub code: Option<String>,
    pub name: Option<String>,
}

impl SubjectPayload {
    fn validate(self) -> Result<(String, String)> {
        Ok((required(self.code, "code")?, required(self.name, "name")?))
    }
}

/// GET /api/subjects
pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>> {
    let subjects = state.with_manager(|manager| manager.get_subjects()).await?;
    Ok(Json(subjects))
}

/// POST /api/subjects
pub async fn create_subject(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubjectPayload>,
) -> Result<(StatusCode, Json<Subject>)> {
    let (code, name) = payload.validate()?;

    let subject = state
        .with_manager(move |manager| manager.create_subject(&code, &name))
        .await?;

    tracing::info!(id = subject.id, code = %subject.code, "subject created");

    Ok((StatusCode::CREATED, Json(subject)))
}

/// PUT /api/subjects/:id
pub async fn update_subject(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<SubjectPayload>,
) -> Result<Json<Subject>> {
    let (code, name) = payload.validate()?;

    let subject = state
        .with_manager(move |manager| manager.update_subject(id, &code, &name))
        .await?;

    Ok(Json(subject))
}

/// DELETE /api/subjects/:id
pub async fn delete_subject(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode> {
    state
        .with_manager(move |manager| manager.delete_subject(id))
        .await?;

    tracing::info!(id, "subject deleted");

    Ok(StatusCode::NO_CONTENT)
}
