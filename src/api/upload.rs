//! Spreadsheet upload endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::{MultipartError, MultipartRejection}},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::AppState;
use crate::import::{is_spreadsheet, sanitize_file_name};

/// The multipart field carrying the workbook.
const FILE_FIELD: &str = "file";

/// Distinguishes uploads stored within the same millisecond.
static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(0);

struct UploadedFile {
    name: String,
    bytes: Bytes,
}

/// POST /api/upload
///
/// Accepts a `.xlsx` or `.xls` workbook in the `file` field and imports its first worksheet.
/// The file is saved to the upload folder first and removed once the import has committed. A
/// failed import leaves the saved file behind.
pub async fn upload_workbook(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return error(rejection.status(), &rejection.body_text()),
    };

    let file = match file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => return error(StatusCode::BAD_REQUEST, "No file provided"),
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(limit = state.max_upload_bytes, "rejected oversized upload");
            let message = format!(
                "File too large: uploads are limited to {} bytes",
                state.max_upload_bytes
            );
            return error(StatusCode::PAYLOAD_TOO_LARGE, &message);
        }
        Err(err) => {
            tracing::warn!(error = %err, "unreadable multipart body");
            return error(err.status(), &err.body_text());
        }
    };

    if file.name.is_empty() {
        return error(StatusCode::BAD_REQUEST, "No file selected");
    }

    if !is_spreadsheet(&file.name) {
        tracing::warn!(file_name = %file.name, "rejected upload with unsupported extension");
        return error(StatusCode::BAD_REQUEST, "Invalid file format");
    }

    let path = state.upload_folder.join(stored_name(&file.name));

    if let Err(err) = save(&path, &file.bytes).await {
        tracing::error!(path = %path.display(), error = %err, "failed to save upload");
        return error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string());
    }

    let import_path = path.clone();
    let result = state
        .with_manager(move |manager| manager.import_workbook(&import_path))
        .await;

    match result {
        Ok(summary) => {
            if let Err(err) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %err, "failed to remove upload");
            }

            Json(json!({
                "message": format!("Successfully processed {} records", summary.processed),
            }))
            .into_response()
        }
        Err(err) => {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "import failed, uploaded file left in place"
            );
            error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Finds the `file` field, skipping any others.
async fn file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        return Ok(Some(UploadedFile { name, bytes }));
    }

    Ok(None)
}

/// The name to store an accepted upload under: the sanitized client name with a timestamp and
/// sequence number appended, so concurrent uploads of the same file never share a path. Falls
/// back to `upload` when sanitizing leaves nothing usable.
fn stored_name(file_name: &str) -> String {
    let sanitized = sanitize_file_name(file_name);
    let (stem, extension) = match sanitized.rsplit_once('.') {
        Some((stem, extension)) if is_spreadsheet(&sanitized) && !stem.is_empty() => {
            (stem.to_string(), extension.to_string())
        }
        _ => {
            let extension = Path::new(file_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("xlsx")
                .to_ascii_lowercase();
            ("upload".to_string(), extension)
        }
    };

    let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let sequence = UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    format!("{stem}-{stamp}-{sequence}.{extension}")
}

async fn save(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(folder) = path.parent() {
        tokio::fs::create_dir_all(folder).await?;
    }
    tokio::fs::write(path, bytes).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
