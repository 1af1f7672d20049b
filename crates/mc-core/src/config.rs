//! Application configuration types.
//!
//! The top-level [`Config`] struct carries the filesystem roots, the
//! transcoder backend settings and session defaults. Every section defaults
//! sensibly so a completely empty document is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Accelerator names understood by the backend layer.
pub const KNOWN_ACCELERATORS: &[&str] = &["vaapi", "cuda", "cuvid", "nvenc", "qsv", "videotoolbox"];

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub transcode: TranscodeConfig,
    pub sessions: SessionsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist. Files ending in `.json`
    /// are parsed as JSON, everything else as TOML.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let parsed = if path.extension().is_some_and(|ext| ext == "json") {
                    Self::from_json(&contents)
                } else {
                    Self::from_toml(&contents)
                };
                parsed.unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file {}: {e}", path.display());
                    Self::default()
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.transcode.segment_duration_secs == 0 {
            warnings.push(
                "transcode.segment_duration_secs is 0; segmented output will be rejected".into(),
            );
        }

        for (i, accel) in self.transcode.hardware_accelerators.iter().enumerate() {
            let name = accel.name.to_ascii_lowercase();
            if !KNOWN_ACCELERATORS.contains(&name.as_str()) {
                warnings.push(format!(
                    "transcode.hardware_accelerators[{i}] '{}' is not a recognized accelerator (valid: {})",
                    accel.name,
                    KNOWN_ACCELERATORS.join(", ")
                ));
            }
            if name == "vaapi" && accel.device.is_none() {
                warnings.push(format!(
                    "transcode.hardware_accelerators[{i}] is vaapi but has no device path"
                ));
            }
        }

        if let Some(ref path) = self.transcode.transcoder_path {
            if path.as_os_str().is_empty() {
                warnings.push("transcode.transcoder_path is empty".into());
            }
        }

        if self.sessions.default_client.trim().is_empty() {
            warnings.push("sessions.default_client is empty".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Filesystem roots for transcoder output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for segment files and segment lists.
    pub cache_dir: PathBuf,
    /// Root for streaming manifests.
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("/var/cache/mediacast"),
            data_dir: PathBuf::from("/var/lib/mediacast"),
        }
    }
}

/// Transcoder backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Explicit transcoder binary. Discovered on `PATH` when unset.
    pub transcoder_path: Option<PathBuf>,
    /// Hardware accelerators in fallback preference order.
    pub hardware_accelerators: Vec<AcceleratorConfig>,
    /// Drop configured accelerators the binary does not report.
    pub probe_hwaccels: bool,
    pub segment_duration_secs: u32,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            transcoder_path: None,
            hardware_accelerators: Vec::new(),
            probe_hwaccels: true,
            segment_duration_secs: 10,
        }
    }
}

/// A single configured hardware accelerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceleratorConfig {
    pub name: String,
    #[serde(default)]
    pub device: Option<PathBuf>,
}

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Client identifier assumed when a capability profile names none.
    pub default_client: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            default_client: "generic".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_valid() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.transcode.segment_duration_secs, 10);
        assert!(config.transcode.probe_hwaccels);
        assert!(config.transcode.hardware_accelerators.is_empty());
        assert_eq!(config.sessions.default_client, "generic");
    }

    #[test]
    fn empty_toml_is_valid() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.paths.cache_dir, PathBuf::from("/var/cache/mediacast"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn toml_accelerator_list_keeps_order() {
        let config = Config::from_toml(
            r#"
            [paths]
            cache_dir = "/tmp/cache"

            [transcode]
            segment_duration_secs = 6

            [[transcode.hardware_accelerators]]
            name = "vaapi"
            device = "/dev/dri/renderD128"

            [[transcode.hardware_accelerators]]
            name = "cuda"
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.paths.data_dir, PathBuf::from("/var/lib/mediacast"));
        assert_eq!(config.transcode.segment_duration_secs, 6);
        let names: Vec<_> = config
            .transcode
            .hardware_accelerators
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["vaapi", "cuda"]);
        assert_eq!(config.transcode.hardware_accelerators[1].device, None);
    }

    #[test]
    fn invalid_toml_is_validation_error() {
        let err = Config::from_toml("transcode = 3").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn validate_flags_problems() {
        let mut config = Config::default();
        config.transcode.segment_duration_secs = 0;
        config.transcode.hardware_accelerators = vec![
            AcceleratorConfig {
                name: "vaapi".into(),
                device: None,
            },
            AcceleratorConfig {
                name: "opencl".into(),
                device: None,
            },
        ];

        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("segment_duration_secs")));
        assert!(warnings.iter().any(|w| w.contains("no device path")));
        assert!(warnings.iter().any(|w| w.contains("'opencl'")));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config = Config::load_or_default(Some(Path::new("/nonexistent/mediacast.toml")));
        assert_eq!(config.transcode.segment_duration_secs, 10);
        let config = Config::load_or_default(None);
        assert_eq!(config.sessions.default_client, "generic");
    }
}
