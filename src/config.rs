//! Runtime settings.
//!
//! Precedence, highest first: command-line flag or environment variable,
//! the optional YAML config file, built-in defaults.
//!
//! ```yaml
//! api_url: https://api.sinpo.id
//! api_token: xxxxxxxx
//! image_base: https://sinpo.id
//! state_dir: /var/lib/sinpo_news
//! output_dir: ./out
//! ```

use crate::api::DEFAULT_API_URL;
use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, instrument};

/// Public site that serves uploads under `/storage`.
pub const DEFAULT_IMAGE_BASE: &str = "https://sinpo.id";

/// Contents of `config.yaml`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub image_base: Option<String>,
    pub state_dir: Option<String>,
    pub output_dir: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub image_base: String,
    pub state_dir: PathBuf,
    pub output_dir: Option<String>,
}

/// Read and parse a YAML config file.
#[instrument(level = "info")]
pub async fn load_file(path: &str) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.to_string(),
        source,
    })
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".sinpo_news")
}

/// Merge CLI values over file values over defaults.
pub fn resolve(cli: &Cli, file: FileConfig) -> Settings {
    let settings = Settings {
        api_url: cli
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        api_token: cli.api_token.clone().or(file.api_token),
        image_base: cli
            .image_base
            .clone()
            .or(file.image_base)
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE.to_string()),
        state_dir: cli
            .state_dir
            .clone()
            .or(file.state_dir)
            .map(PathBuf::from)
            .unwrap_or_else(default_state_dir),
        output_dir: cli.output_dir.clone().or(file.output_dir),
    };
    debug!(api_url = %settings.api_url, image_base = %settings.image_base, "Resolved settings");
    settings
}

/// Load the file named by `--config`, if any, and resolve.
pub async fn settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let file = match &cli.config {
        Some(path) => load_file(path).await?,
        None => FileConfig::default(),
    };
    Ok(resolve(cli, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["sinpo_news"];
        argv.extend_from_slice(args);
        argv.push("gallery");
        Cli::parse_from(argv)
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            api_url: Some("https://file.example/api".to_string()),
            image_base: Some("https://img.example".to_string()),
            ..FileConfig::default()
        };
        let settings = resolve(&cli(&["--api-url", "https://flag.example"]), file);

        assert_eq!(settings.api_url, "https://flag.example");
        assert_eq!(settings.image_base, "https://img.example");
    }

    #[test]
    fn test_defaults_apply() {
        let settings = resolve(&cli(&["--state-dir", "/tmp/s"]), FileConfig::default());
        assert_eq!(settings.state_dir, PathBuf::from("/tmp/s"));
        assert_eq!(settings.output_dir, None);
    }

    #[tokio::test]
    async fn test_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "api_url: https://api.example\noutput_dir: ./out\n").unwrap();

        let file = load_file(path.to_str().unwrap()).await.unwrap();
        assert_eq!(file.api_url.as_deref(), Some("https://api.example"));
        assert_eq!(file.output_dir.as_deref(), Some("./out"));
        assert_eq!(file.api_token, None);
    }

    #[tokio::test]
    async fn test_load_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.yaml");
        assert!(matches!(
            load_file(missing.to_str().unwrap()).await,
            Err(ConfigError::Io { .. })
        ));

        let bad = tmp.path().join("bad.yaml");
        std::fs::write(&bad, "unknown_key: 1\n").unwrap();
        assert!(matches!(
            load_file(bad.to_str().unwrap()).await,
            Err(ConfigError::Yaml { .. })
        ));
    }
}
