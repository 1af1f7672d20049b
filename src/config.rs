//! Configuration loading for the binary.
//!
//! The typed configuration lives in [`mc_core::config`]; this module finds
//! the file on disk and reports problems with context.

use anyhow::{Context, Result};
use std::path::Path;

pub use mc_core::config::Config;

/// Locations searched, in order, when no `--config` is given.
const DEFAULT_PATHS: &[&str] = &[
    "./mediacast.toml",
    "~/.config/mediacast/config.toml",
    "/etc/mediacast/config.toml",
];

/// Load configuration from a TOML (or `.json`) file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = if path.extension().is_some_and(|ext| ext == "json") {
        Config::from_json(&content)
    } else {
        Config::from_toml(&content)
    }
    .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    Ok(config)
}

/// Load config from the given path, else from default locations, else
/// return the default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {}", path.display());
            return load_config(path);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_with_defaults_for_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mediacast.toml");
        std::fs::write(
            &path,
            r#"
[transcode]
segment_duration_secs = 6

[[transcode.hardware_accelerators]]
name = "cuda"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.transcode.segment_duration_secs, 6);
        assert_eq!(config.transcode.hardware_accelerators[0].name, "cuda");
        assert_eq!(config.sessions.default_client, "generic");
    }

    #[test]
    fn loads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"sessions": {"default_client": "chromecast"}}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sessions.default_client, "chromecast");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config_or_default(Some(Path::new("/nonexistent/mediacast.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "transcode = [").unwrap();
        assert!(load_config(&path).is_err());
    }
}
