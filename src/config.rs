//! Analyzer configuration
//!
//! Loaded from a TOML file; every field has a default so a partial file (or
//! none at all) is valid.
//!
//! ```toml
//! data_csv = "runtime/data/sample_data.csv"
//! data_xml = "runtime/data/users.xml"
//! presence_ttl_secs = 600
//! directory_ttl_secs = 3600
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Paths of the backing sources and the cache windows for each of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Presence CSV (`user_id,date,start,end`)
    #[serde(default = "default_data_csv")]
    pub data_csv: PathBuf,

    /// User directory XML
    #[serde(default = "default_data_xml")]
    pub data_xml: PathBuf,

    /// Seconds a parsed presence store stays valid
    #[serde(default = "default_ttl_secs")]
    pub presence_ttl_secs: u64,

    /// Seconds a parsed directory stays valid
    #[serde(default = "default_ttl_secs")]
    pub directory_ttl_secs: u64,
}

fn default_data_csv() -> PathBuf {
    PathBuf::from("runtime/data/sample_data.csv")
}

fn default_data_xml() -> PathBuf {
    PathBuf::from("runtime/data/users.xml")
}

fn default_ttl_secs() -> u64 {
    600
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            data_csv: default_data_csv(),
            data_xml: default_data_xml(),
            presence_ttl_secs: default_ttl_secs(),
            directory_ttl_secs: default_ttl_secs(),
        }
    }
}

impl AnalyzerConfig {
    /// Load and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AnalyzerConfig =
            toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    pub fn presence_ttl(&self) -> Duration {
        Duration::from_secs(self.presence_ttl_secs)
    }

    pub fn directory_ttl(&self) -> Duration {
        Duration::from_secs(self.directory_ttl_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.data_csv.as_os_str().is_empty() {
            return Err("data_csv must not be empty".to_string());
        }

        if self.data_xml.as_os_str().is_empty() {
            return Err("data_xml must not be empty".to_string());
        }

        if self.presence_ttl_secs == 0 {
            return Err("presence_ttl_secs must be > 0".to_string());
        }

        if self.directory_ttl_secs == 0 {
            return Err("directory_ttl_secs must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.presence_ttl(), Duration::from_secs(600));
        assert_eq!(config.directory_ttl(), Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AnalyzerConfig::from_toml("data_csv = \"/srv/presence.csv\"").unwrap();
        assert_eq!(config.data_csv, PathBuf::from("/srv/presence.csv"));
        assert_eq!(config.data_xml, default_data_xml());
        assert_eq!(config.presence_ttl_secs, 600);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = AnalyzerConfig::from_toml("presence_ttl_secs = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_empty_path_rejected() {
        let mut config = AnalyzerConfig::default();
        config.data_xml = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "directory_ttl_secs = 3600").unwrap();
        file.flush().unwrap();

        let config = AnalyzerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.directory_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_malformed_toml() {
        let err = AnalyzerConfig::from_toml("presence_ttl_secs = \"soon\"").unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }
}
