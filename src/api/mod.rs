//! HTTP handlers for the JSON API and the HTML pages.

pub mod analytics;
pub mod attendance;
pub mod health;
pub mod pages;
pub mod students;
pub mod subjects;
pub mod upload;

pub use analytics::analytics_summary;
pub use attendance::{create_attendance, delete_attendance, list_attendance};
pub use health::health_routes;
pub use pages::{attendance_page, dashboard_page, students_page, subjects_page, upload_page};
pub use students::{create_student, delete_student, list_students, update_student};
pub use subjects::{create_subject, delete_subject, list_subjects, update_subject};
pub use upload::upload_workbook;

use axum::{
    Json, RequestPartsExt, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Unwraps a request field that must be present.
fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(Error::MissingField(field))
}

/// [`Json`] whose rejection is reported as an [`Error`].
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// [`Path`] whose rejection is reported as an [`Error`].
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let Path(value) = parts.extract::<Path<T>>().await?;
        Ok(Self(value))
    }
}
