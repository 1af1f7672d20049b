//! Transcoder discovery.
//!
//! Runs once at startup and produces the read-only [`Backend`] shared by
//! every session.

use std::path::{Path, PathBuf};

use mc_core::config::TranscodeConfig;
use mc_core::{Error, Result};
use mc_transcode::{Backend, HardwareAccelerator};
use serde::{Deserialize, Serialize};

/// Executable name searched for on `PATH`.
const TRANSCODER: &str = "ffmpeg";

/// Install locations tried when the binary is not on `PATH`.
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
    "/opt/ffmpeg/bin/ffmpeg",
    "/usr/lib/jellyfin-ffmpeg/ffmpeg",
];

/// Availability information for the transcoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of the version banner, if available.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
    /// Acceleration methods the binary reports.
    pub hwaccels: Vec<String>,
}

/// Find the transcoder binary.
///
/// A configured path is used when it exists; otherwise `PATH` is searched,
/// then a list of well-known install locations.
pub fn locate_transcoder(config: &TranscodeConfig) -> Result<PathBuf> {
    if let Some(custom) = config.transcoder_path.as_deref() {
        if custom.exists() {
            return Ok(custom.to_path_buf());
        }
        tracing::warn!(
            "Configured transcoder {} does not exist; searching PATH",
            custom.display()
        );
    }

    if let Ok(path) = which::which(TRANSCODER) {
        return Ok(path);
    }

    WELL_KNOWN_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| {
            Error::tool(
                TRANSCODER,
                format!("{TRANSCODER} not found; is it installed and in PATH?"),
            )
        })
}

/// Run `<transcoder> -version` and return the first line of stdout.
pub fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path).arg("-version").output().ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

/// Run `<transcoder> -hwaccels` and return the listed methods.
pub fn detect_hwaccels(path: &Path) -> Option<Vec<String>> {
    let output = std::process::Command::new(path)
        .args(["-hide_banner", "-hwaccels"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    Some(parse_hwaccels(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `-hwaccels` output: a header line followed by one method per line.
pub fn parse_hwaccels(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.ends_with(':'))
        .map(|l| l.to_ascii_lowercase())
        .collect()
}

/// Keep the configured accelerators that are usable, in configured order.
///
/// Unknown names, accelerators missing from `available` (when the binary
/// was probed) and vaapi devices that do not exist are dropped with a
/// warning.
pub fn resolve_accelerators(
    config: &TranscodeConfig,
    available: Option<&[String]>,
) -> Vec<HardwareAccelerator> {
    let mut accelerators = Vec::new();

    for entry in &config.hardware_accelerators {
        let accel = match HardwareAccelerator::from_config(entry) {
            Ok(accel) => accel,
            Err(e) => {
                tracing::warn!("Skipping accelerator '{}': {e}", entry.name);
                continue;
            }
        };

        if let Some(available) = available {
            let listed = accel
                .kind
                .probe_names()
                .iter()
                .any(|name| available.iter().any(|a| a == name));
            if !listed {
                tracing::warn!("Skipping accelerator {accel}: not supported by the transcoder");
                continue;
            }
        }

        if let Some(device) = accel.device.as_deref() {
            if !device.exists() {
                tracing::warn!(
                    "Skipping accelerator {accel}: device {} does not exist",
                    device.display()
                );
                continue;
            }
        }

        if accelerators.contains(&accel) {
            continue;
        }
        accelerators.push(accel);
    }

    accelerators
}

/// Locate the transcoder and build the backend descriptor.
pub fn discover_backend(config: &TranscodeConfig) -> Result<Backend> {
    let transcoder = locate_transcoder(config)?;
    let version = detect_version(&transcoder);

    let probed = if config.probe_hwaccels && !config.hardware_accelerators.is_empty() {
        detect_hwaccels(&transcoder)
    } else {
        None
    };
    let accelerators = resolve_accelerators(config, probed.as_deref());

    tracing::info!(
        transcoder = %transcoder.display(),
        version = version.as_deref().unwrap_or("unknown"),
        accelerators = ?accelerators.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "Transcoder backend discovered"
    );

    Ok(Backend::new(transcoder)
        .with_version(version)
        .with_accelerators(accelerators))
}

/// Availability report for the `check-tools` command.
pub fn check_transcoder(config: &TranscodeConfig) -> ToolInfo {
    match locate_transcoder(config) {
        Ok(path) => ToolInfo {
            name: TRANSCODER.to_string(),
            available: true,
            version: detect_version(&path),
            hwaccels: detect_hwaccels(&path).unwrap_or_default(),
            path: Some(path),
        },
        Err(_) => ToolInfo {
            name: TRANSCODER.to_string(),
            available: false,
            version: None,
            path: None,
            hwaccels: Vec::new(),
        },
    }
}
