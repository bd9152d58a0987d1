use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod display;
pub mod error;
pub mod import;
pub mod manager;
pub mod models;
pub mod schema;
pub mod settings;

pub use crate::error::{Error, Result};
use crate::manager::AttendanceManager;
use crate::settings::{DEFAULT_MAX_UPLOAD_BYTES, Settings};

/// Opens the database named in the settings, creating its tables if needed.
pub fn create_default_manager(settings: &Settings) -> Result<AttendanceManager> {
    AttendanceManager::connect(&settings.database.url)
}

/// State shared by every HTTP handler.
///
/// The single database connection sits behind a mutex, so requests touch the database one at a
/// time.
#[derive(Clone)]
pub struct AppState {
    manager: Arc<Mutex<AttendanceManager>>,
    /// Where uploaded workbooks are saved before they are imported.
    pub upload_folder: PathBuf,
    /// Body size limit for `POST /api/upload`.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(manager: AttendanceManager, upload_folder: impl Into<PathBuf>) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
            upload_folder: upload_folder.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Runs `f` against the manager on the blocking thread pool.
    pub async fn with_manager<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut AttendanceManager) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let manager = Arc::clone(&self.manager);

        tokio::task::spawn_blocking(move || {
            let mut manager = manager
                .lock()
                .map_err(|_| Error::Internal("database lock poisoned".into()))?;
            f(&mut manager)
        })
        .await
        .map_err(|err| Error::Internal(err.to_string()))?
    }
}

/// Builds the application router: the JSON API under `/api`, the HTML pages, and `/health`.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    let api_routes = Router::new()
        .route(
            "/api/students",
            get(api::list_students).post(api::create_student),
        )
        .route(
            "/api/students/:id",
            put(api::update_student).delete(api::delete_student),
        )
        .route(
            "/api/subjects",
            get(api::list_subjects).post(api::create_subject),
        )
        .route(
            "/api/subjects/:id",
            put(api::update_subject).delete(api::delete_subject),
        )
        .route(
            "/api/attendance",
            get(api::list_attendance).post(api::create_attendance),
        )
        .route("/api/attendance/:id", delete(api::delete_attendance))
        .route(
            "/api/upload",
            post(api::upload_workbook).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/api/analytics/summary", get(api::analytics_summary));

    let page_routes = Router::new()
        .route("/", get(api::dashboard_page))
        .route("/students", get(api::students_page))
        .route("/subjects", get(api::subjects_page))
        .route("/attendance", get(api::attendance_page))
        .route("/upload", get(api::upload_page));

    Router::new()
        .merge(api_routes)
        .merge(page_routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
