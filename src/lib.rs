//! Presence Analyzer - employee presence ingestion and aggregation
//!
//! This library parses clock-in/clock-out records into an in-memory presence
//! store, computes weekday and monthly statistics per user, and keeps parsed
//! snapshots behind a TTL cache with single-flight refresh.

pub mod aggregate;
pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;

pub use analyzer::PresenceAnalyzer;
pub use config::AnalyzerConfig;
pub use error::{Error, Result};
