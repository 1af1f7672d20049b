//! Backend descriptors: the transcoder binary and its hardware accelerators.
//!
//! A [`Backend`] is produced once at startup and only read afterwards.
//! Accelerator order is fallback preference order.

use mc_core::config::AcceleratorConfig;
use mc_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::catalog::normalize_codec;
use crate::command::Arg;

/// Supported hardware acceleration families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceleratorKind {
    Vaapi,
    /// NVIDIA decode/encode; also accepted as `cuvid` or `nvenc`.
    Cuda,
    Qsv,
    VideoToolbox,
}

impl AcceleratorKind {
    /// Name used by the transcoder's `-hwaccel` option.
    pub fn hwaccel_name(self) -> &'static str {
        match self {
            Self::Vaapi => "vaapi",
            Self::Cuda => "cuda",
            Self::Qsv => "qsv",
            Self::VideoToolbox => "videotoolbox",
        }
    }

    /// Names under which the transcoder may list this family in `-hwaccels`.
    pub fn probe_names(self) -> &'static [&'static str] {
        match self {
            Self::Vaapi => &["vaapi"],
            Self::Cuda => &["cuda", "cuvid", "nvdec"],
            Self::Qsv => &["qsv"],
            Self::VideoToolbox => &["videotoolbox"],
        }
    }
}

impl fmt::Display for AcceleratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hwaccel_name())
    }
}

impl FromStr for AcceleratorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vaapi" => Ok(Self::Vaapi),
            "cuda" | "cuvid" | "nvenc" => Ok(Self::Cuda),
            "qsv" => Ok(Self::Qsv),
            "videotoolbox" => Ok(Self::VideoToolbox),
            other => Err(Error::Validation(format!(
                "unknown hardware accelerator '{other}'"
            ))),
        }
    }
}

/// A hardware accelerator and the device it drives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareAccelerator {
    pub kind: AcceleratorKind,
    #[serde(default)]
    pub device: Option<PathBuf>,
}

impl HardwareAccelerator {
    pub fn new(kind: AcceleratorKind, device: Option<PathBuf>) -> Self {
        Self { kind, device }
    }

    pub fn from_config(config: &AcceleratorConfig) -> Result<Self> {
        Ok(Self::new(config.name.parse()?, config.device.clone()))
    }

    /// Hardware encoder for a logical codec, if this family has one.
    pub fn encoder(&self, codec: &str) -> Option<&'static str> {
        let codec = normalize_codec(codec);
        match (self.kind, codec.as_str()) {
            (AcceleratorKind::Vaapi, "h264") => Some("h264_vaapi"),
            (AcceleratorKind::Vaapi, "hevc") => Some("hevc_vaapi"),
            (AcceleratorKind::Vaapi, "vp8") => Some("vp8_vaapi"),
            (AcceleratorKind::Cuda, "h264") => Some("h264_nvenc"),
            (AcceleratorKind::Cuda, "hevc") => Some("hevc_nvenc"),
            (AcceleratorKind::Qsv, "h264") => Some("h264_qsv"),
            (AcceleratorKind::Qsv, "hevc") => Some("hevc_qsv"),
            (AcceleratorKind::VideoToolbox, "h264") => Some("h264_videotoolbox"),
            (AcceleratorKind::VideoToolbox, "hevc") => Some("hevc_videotoolbox"),
            _ => None,
        }
    }

    /// Decoding hints placed before the input. With `keep_on_device` the
    /// decoded frames stay in device memory for a hardware filter chain.
    pub fn decode_args(&self, keep_on_device: bool) -> Vec<Arg> {
        let param = |key: &str, value: &str| Arg::Param {
            key: key.into(),
            value: value.into(),
        };

        let mut args = vec![param("-hwaccel", self.kind.hwaccel_name())];
        if self.kind == AcceleratorKind::Vaapi {
            if let Some(device) = &self.device {
                args.push(param("-vaapi_device", &device.to_string_lossy()));
            }
            if keep_on_device {
                args.push(param("-hwaccel_output_format", "vaapi"));
            }
        }
        args
    }
}

impl fmt::Display for HardwareAccelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.device {
            Some(device) => write!(f, "{} ({})", self.kind, device.display()),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// The transcoder binary and its usable accelerators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub transcoder: PathBuf,
    /// First line of the transcoder's version banner.
    #[serde(default)]
    pub version: Option<String>,
    /// Accelerators in fallback preference order.
    #[serde(default)]
    pub accelerators: Vec<HardwareAccelerator>,
}

impl Backend {
    pub fn new(transcoder: PathBuf) -> Self {
        Self {
            transcoder,
            version: None,
            accelerators: Vec::new(),
        }
    }

    pub fn with_accelerators(mut self, accelerators: Vec<HardwareAccelerator>) -> Self {
        self.accelerators = accelerators;
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }
}
