//! Application settings, layered from defaults, `config.toml`, and the environment.

use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// The configuration file looked up when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Default for `upload.max_bytes`: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub upload: UploadSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadSettings {
    /// Where uploaded workbooks are written before they are imported.
    pub folder: PathBuf,
    /// Largest accepted upload request body, in bytes.
    pub max_bytes: usize,
}

impl Settings {
    /// Loads settings from, in increasing order of precedence:
    ///
    /// 1. built-in defaults,
    /// 2. the configuration file `config_file` (any extension the `config` crate understands,
    ///    e.g. `config.toml`), if it exists,
    /// 3. `ATTENDANCE__`-prefixed environment variables, e.g. `ATTENDANCE__SERVER__PORT=8080`,
    /// 4. `DATABASE_URL`, which may also come from a `.env` file.
    pub fn load(config_file: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .set_default("database.url", "attendance.db")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("upload.folder", "uploads")?
            .set_default("upload.max_bytes", DEFAULT_MAX_UPLOAD_BYTES as u64)?
            .add_source(File::with_name(config_file).required(false))
            .add_source(
                Environment::with_prefix("ATTENDANCE")
                    .prefix_separator("__")
                    .separator("__"),
            );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// The `host:port` the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
