use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

const CONFIG_FILE: &str = "receipt2tx.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Source URIs scanned in addition to the ones given on the command line.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("receipt2tx")
            .join(CONFIG_FILE)
    }

    /// Load the config at `path`, or at the default location. A missing file
    /// yields the empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Command-line URIs first, then configured sources.
    pub fn sources_with(&self, uris: Vec<String>) -> Vec<String> {
        let mut all = uris;
        all.extend(self.sources.iter().cloned());
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sources() {
        let config = AppConfig::parse(
            r#"
            sources = ["file:///var/receipts/inbox", "file://scans"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.sources,
            ["file:///var/receipts/inbox", "file://scans"]
        );
    }

    #[test]
    fn empty_file_is_default() {
        let config = AppConfig::parse("").unwrap();
        assert!(config.sources.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::parse("repository = \"x\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(config.sources.is_empty());
    }

    #[test]
    fn command_line_sources_come_first() {
        let config = AppConfig {
            sources: vec!["file:///b".to_string()],
        };
        let all = config.sources_with(vec!["file:///a".to_string()]);
        assert_eq!(all, ["file:///a", "file:///b"]);
    }
}
