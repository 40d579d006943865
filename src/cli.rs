//! CLI argument parsing for Presence Analyzer

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "presence-analyzer")]
#[command(version)]
#[command(about = "Weekday and monthly presence statistics from clock-in records", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Presence CSV (overrides the configuration file)
    #[arg(long = "csv", value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// User directory XML (overrides the configuration file)
    #[arg(long = "xml", value_name = "FILE")]
    pub xml: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List directory users
    Users,
    /// Avatar URL of a user
    Avatar { user_id: i64 },
    /// Mean presence time per weekday
    MeanWeekday { user_id: i64 },
    /// Total presence time per weekday
    Weekday { user_id: i64 },
    /// Mean start and end time per weekday
    StartEnd { user_id: i64 },
    /// Total presence time per month
    Monthly { user_id: i64 },
}
