//! This module contains the command-line interface [`Cli`] parser for running the attendance server
//! and managing attendance records from a terminal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::DEFAULT_CONFIG_FILE;

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file to load, with or without its extension.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// The different commands available for managing attendance records.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web application.
    Serve {
        /// Address to listen on, overriding the configuration.
        #[arg(long, env = "ATTENDANCE_HOST")]
        host: Option<String>,

        /// Port to listen on, overriding the configuration.
        #[arg(long, env = "ATTENDANCE_PORT")]
        port: Option<u16>,
    },

    /// Import attendance records from an `.xlsx` or `.xls` workbook.
    Import { file_path: PathBuf },

    /// List every student on the roster.
    Students,

    /// List every subject.
    Subjects,

    /// List every attendance record.
    Attendance,

    /// Show the dashboard statistics.
    Summary,
}
