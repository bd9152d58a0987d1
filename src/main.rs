use anyhow::{Context, Result};
use attendance_admin::cli::{Cli, Command};
use attendance_admin::settings::Settings;
use attendance_admin::{AppState, build_router, create_default_manager, display};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config).context("failed to load settings")?;

    let mut manager = create_default_manager(&settings)
        .with_context(|| format!("failed to open database {}", settings.database.url))?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }

            info!(
                "Starting attendance-admin v{} (database {}, uploads in {})",
                env!("CARGO_PKG_VERSION"),
                settings.database.url,
                settings.upload.folder.display()
            );

            let state = AppState::new(manager, settings.upload.folder.clone())
                .with_max_upload_bytes(settings.upload.max_bytes);
            let app = build_router(state);

            let address = settings.bind_address();
            let listener = tokio::net::TcpListener::bind(&address)
                .await
                .with_context(|| format!("failed to bind {address}"))?;
            info!("Listening on http://{address}");

            axum::serve(listener, app).await?;
        }
        Command::Import { file_path } => {
            let summary = manager
                .import_workbook(&file_path)
                .with_context(|| format!("failed to import {}", file_path.display()))?;

            println!("Successfully processed {} records", summary.processed);
            println!(
                "New students: {}, new subjects: {}, duplicate rows skipped: {}",
                summary.students_created, summary.subjects_created, summary.duplicates_skipped
            );
        }
        Command::Students => {
            let roster = manager.get_roster()?;
            println!("Roster:\n{}", display::students_table(&roster));
        }
        Command::Subjects => {
            let subjects = manager.get_subjects()?;
            println!("Subjects:\n{}", display::subjects_table(&subjects));
        }
        Command::Attendance => {
            let entries = manager.get_attendance()?;
            println!("Attendance:\n{}", display::attendance_table(&entries));
        }
        Command::Summary => {
            let stats = manager.dashboard_stats()?;
            println!("Summary:\n{}", display::stats_table(&stats));
        }
    }

    Ok(())
}
