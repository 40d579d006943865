//! Composition root: cached presence store and user directory
//!
//! # Example
//!
//! ```no_run
//! use presence_analyzer::{AnalyzerConfig, PresenceAnalyzer};
//! use presence_analyzer::aggregate::group_by_weekday;
//!
//! let analyzer = PresenceAnalyzer::new(AnalyzerConfig::default());
//! let store = analyzer.presence_store().unwrap();
//! if let Some(days) = store.user(10) {
//!     println!("{:?}", group_by_weekday(days));
//! }
//! ```

use crate::cache::{CacheStats, CachedValue, Clock, SystemClock};
use crate::config::AnalyzerConfig;
use crate::directory::Directory;
use crate::error::Result;
use crate::model::PresenceStore;
use crate::parser::load_presence_store;
use std::sync::Arc;

/// Cache key of the presence store
pub const PRESENCE_KEY: &str = "presence_store";
/// Cache key of the user directory
pub const DIRECTORY_KEY: &str = "directory";

/// Owns the cached snapshots handed to request handlers
///
/// Share it by reference (or behind an `Arc`) between handler threads.
#[derive(Debug)]
pub struct PresenceAnalyzer {
    config: AnalyzerConfig,
    presence: CachedValue<PresenceStore>,
    directory: CachedValue<Directory>,
}

impl PresenceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build with an explicit clock driving both cache windows
    pub fn with_clock(config: AnalyzerConfig, clock: Arc<dyn Clock>) -> Self {
        let csv_path = config.data_csv.clone();
        let presence = CachedValue::with_clock(
            PRESENCE_KEY,
            config.presence_ttl(),
            Arc::clone(&clock),
            move || load_presence_store(&csv_path).map(|(store, _)| store),
        );

        let xml_path = config.data_xml.clone();
        let directory = CachedValue::with_clock(
            DIRECTORY_KEY,
            config.directory_ttl(),
            clock,
            move || Directory::from_file(&xml_path),
        );

        Self {
            config,
            presence,
            directory,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Current presence store, re-parsed when older than its TTL
    pub fn presence_store(&self) -> Result<Arc<PresenceStore>> {
        self.presence.get()
    }

    /// Current user directory, re-parsed when older than its TTL
    pub fn directory(&self) -> Result<Arc<Directory>> {
        self.directory.get()
    }

    pub fn presence_stats(&self) -> CacheStats {
        self.presence.stats()
    }

    pub fn directory_stats(&self) -> CacheStats {
        self.directory.stats()
    }
}
