//! Command synthesis.
//!
//! A [`Synthesizer`] turns a negotiated [`TranscodeProfile`] into ordered
//! [`CommandVariant`]s: one per hardware accelerator followed by a software
//! fallback when the video is converted, otherwise a single software
//! variant. Callers try variants in order and keep the first that succeeds.
//!
//! [`TranscodeProfile`]: crate::profile::TranscodeProfile

mod encode;
mod full;
mod segment;

pub use segment::SegmentRequest;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter;
use std::path::Path;
use std::sync::Arc;

use crate::backend::{Backend, HardwareAccelerator};
use crate::catalog::Catalog;
use crate::paths::StreamPaths;

/// Default segment length for segmented delivery.
pub const DEFAULT_SEGMENT_DURATION: u32 = 10;

// ---------------------------------------------------------------------------
// Typed arguments
// ---------------------------------------------------------------------------

/// One token group of a transcoder invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Arg {
    /// The transcoder executable.
    Program { path: String },
    /// A valueless switch such as `-sn`.
    Flag { name: String },
    /// A switch with one value such as `-c:v copy`.
    Param { key: String, value: String },
    /// An input file, rendered as `-i <path>`.
    Input { path: String },
    /// The output target; `-` is stdout.
    Output { target: String },
}

impl Arg {
    fn render(&self, out: &mut Vec<String>) {
        match self {
            Arg::Program { path } => out.push(path.clone()),
            Arg::Flag { name } => out.push(name.clone()),
            Arg::Param { key, value } => {
                out.push(key.clone());
                out.push(value.clone());
            }
            Arg::Input { path } => {
                out.push("-i".into());
                out.push(path.clone());
            }
            Arg::Output { target } => out.push(target.clone()),
        }
    }
}

/// One candidate invocation of the transcoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandVariant {
    /// Accelerator this variant targets; `None` is the software path.
    pub accelerator: Option<HardwareAccelerator>,
    pub args: Vec<Arg>,
}

impl CommandVariant {
    /// Flatten into the argument vector, program first.
    pub fn to_args(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() * 2);
        for arg in &self.args {
            arg.render(&mut out);
        }
        out
    }

    pub fn program(&self) -> Option<&str> {
        self.args.iter().find_map(|a| match a {
            Arg::Program { path } => Some(path.as_str()),
            _ => None,
        })
    }

    /// Every value given for `key`, in order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.args
            .iter()
            .filter_map(|a| match a {
                Arg::Param { key: k, value } if k == key => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First value given for `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values(key).into_iter().next()
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.args
            .iter()
            .any(|a| matches!(a, Arg::Flag { name: n } if n == name))
    }

    pub fn inputs(&self) -> Vec<&str> {
        self.args
            .iter()
            .filter_map(|a| match a {
                Arg::Input { path } => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn output(&self) -> Option<&str> {
        self.args.iter().rev().find_map(|a| match a {
            Arg::Output { target } => Some(target.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for CommandVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_args().join(" "))
    }
}

/// Accumulates typed arguments for one variant.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    args: Vec<Arg>,
}

impl CommandBuilder {
    pub fn new(program: &Path) -> Self {
        Self {
            args: vec![Arg::Program {
                path: program.to_string_lossy().into_owned(),
            }],
        }
    }

    pub fn flag(&mut self, name: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Flag { name: name.into() });
        self
    }

    pub fn param(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.args.push(Arg::Param {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn input(&mut self, path: &Path) -> &mut Self {
        self.args.push(Arg::Input {
            path: path.to_string_lossy().into_owned(),
        });
        self
    }

    pub fn output(&mut self, target: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Output {
            target: target.into(),
        });
        self
    }

    pub fn extend(&mut self, args: impl IntoIterator<Item = Arg>) -> &mut Self {
        self.args.extend(args);
        self
    }

    pub fn has_input(&self) -> bool {
        self.args.iter().any(|a| matches!(a, Arg::Input { .. }))
    }

    pub fn finish(self, accelerator: Option<&HardwareAccelerator>) -> CommandVariant {
        CommandVariant {
            accelerator: accelerator.cloned(),
            args: self.args,
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Builds command variants for negotiated profiles.
///
/// Holds only read-only state, so one instance can serve every session.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    backend: Arc<Backend>,
    catalog: Catalog,
    paths: StreamPaths,
    segment_duration: u32,
}

impl Synthesizer {
    pub fn new(backend: Arc<Backend>, paths: StreamPaths) -> Self {
        Self {
            backend,
            catalog: Catalog::standard(),
            paths,
            segment_duration: DEFAULT_SEGMENT_DURATION,
        }
    }

    /// Override the segment length. Zero is raised to one second.
    pub fn with_segment_duration(mut self, secs: u32) -> Self {
        self.segment_duration = secs.max(1);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn paths(&self) -> &StreamPaths {
        &self.paths
    }

    /// Accelerator slots in variant order: every accelerator then software
    /// when converting, software alone otherwise.
    fn slots(&self, convert: bool) -> Vec<Option<&HardwareAccelerator>> {
        if convert {
            self.backend
                .accelerators
                .iter()
                .map(Some)
                .chain(iter::once(None))
                .collect()
        } else {
            vec![None]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AcceleratorKind;
    use std::path::PathBuf;

    #[test]
    fn renders_in_order() {
        let mut b = CommandBuilder::new(Path::new("/usr/bin/ffmpeg"));
        b.param("-ss", 30)
            .input(Path::new("/media/a.mkv"))
            .flag("-sn")
            .param("-f", "matroska")
            .output("-");
        let variant = b.finish(None);

        assert_eq!(
            variant.to_args(),
            ["/usr/bin/ffmpeg", "-ss", "30", "-i", "/media/a.mkv", "-sn", "-f", "matroska", "-"]
        );
        assert_eq!(variant.program(), Some("/usr/bin/ffmpeg"));
        assert_eq!(variant.value("-ss"), Some("30"));
        assert!(variant.has_flag("-sn"));
        assert_eq!(variant.inputs(), ["/media/a.mkv"]);
        assert_eq!(variant.output(), Some("-"));
        assert_eq!(
            variant.to_string(),
            "/usr/bin/ffmpeg -ss 30 -i /media/a.mkv -sn -f matroska -"
        );
    }

    #[test]
    fn slots_follow_accelerator_order() {
        let backend = Backend::new(PathBuf::from("ffmpeg")).with_accelerators(vec![
            HardwareAccelerator::new(AcceleratorKind::Vaapi, Some(PathBuf::from("/dev/dri/renderD128"))),
            HardwareAccelerator::new(AcceleratorKind::Cuda, None),
        ]);
        let synth = Synthesizer::new(Arc::new(backend), StreamPaths::new("/cache", "/data"));

        let slots = synth.slots(true);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].map(|a| a.kind), Some(AcceleratorKind::Vaapi));
        assert_eq!(slots[1].map(|a| a.kind), Some(AcceleratorKind::Cuda));
        assert!(slots[2].is_none());
        assert_eq!(synth.slots(false), vec![None]);
    }

    #[test]
    fn zero_segment_duration_is_raised() {
        let synth = Synthesizer::new(
            Arc::new(Backend::new(PathBuf::from("ffmpeg"))),
            StreamPaths::new("/cache", "/data"),
        )
        .with_segment_duration(0);
        assert_eq!(synth.segment_duration, 1);
    }

    #[test]
    fn variant_serializes_typed_args() {
        let mut b = CommandBuilder::new(Path::new("ffmpeg"));
        b.param("-c:v", "copy");
        let json = serde_json::to_value(b.finish(None)).unwrap();
        assert_eq!(json["args"][1]["kind"], "param");
        assert_eq!(json["args"][1]["key"], "-c:v");
    }
}
