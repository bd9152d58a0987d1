use axum::{Json, extract::State};

use crate::AppState;
use crate::error::Result;
use crate::models::AttendanceSummary;

/// GET /api/analytics/summary
///
/// Present / absent counts and the attendance rate over every record.
pub async fn analytics_summary(State(state): State<AppState>) -> Result<Json<AttendanceSummary>> {
    let summary = state.with_manager(|manager| manager.summary()).await?;
    Ok(Json(summary))
}
