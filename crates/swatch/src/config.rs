//! Configuration file (swatch.toml).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use swatch_preview::{FrameSizing, PreviewConfig};

/// Parsed swatch.toml. Every section and field is optional.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub frame: FrameSizing,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_open")]
    pub open: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7777
}
fn default_open() -> bool {
    true
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open: default_open(),
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = load(&temp.path().join("swatch.toml")).unwrap();

        assert_eq!(config.server.port, 7777);
        assert_eq!(config.frame, FrameSizing::default());
        assert_eq!(config.preview, PreviewConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config: ConfigFile = toml::from_str(
            r#"
[server]
port = 8080

[preview.assets]
tailwind = ""

[frame]
min_height = 120
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.preview.assets.tailwind.as_deref(), Some(""));
        assert_eq!(config.preview.title, "Preview");
        assert_eq!(config.frame.min_height, 120);
        assert_eq!(config.frame.padding, 40);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("swatch.toml");
        fs::write(&path, "[server]\nport = \"not a port\"").unwrap();

        assert!(load(&path).is_err());
    }
}
