//! # mc-transcode
//!
//! Transcode negotiation and command synthesis for mediacast.
//!
//! - **Catalog** ([`Catalog`]): quality tiers, codec support and
//!   codec/container tables.
//! - **Negotiation** ([`negotiate`]): per-stream copy-or-convert decisions
//!   for a source and a client capability profile.
//! - **Backends** ([`Backend`]): the transcoder binary and its ordered
//!   hardware accelerators.
//! - **Synthesis** ([`Synthesizer`]): full-file and per-segment command
//!   variants with accelerator fallback.
//! - **Registry** ([`ProfileRegistry`]): live profiles, terminating their
//!   process on removal.
//!
//! Nothing here spawns processes; see `mc-av` for execution.

pub mod backend;
pub mod capability;
pub mod catalog;
pub mod command;
pub mod decision;
pub mod negotiate;
pub mod paths;
pub mod profile;
pub mod registry;
pub mod source;

pub use backend::{AcceleratorKind, Backend, HardwareAccelerator};
pub use capability::CapabilityProfile;
pub use catalog::Catalog;
pub use command::{Arg, CommandBuilder, CommandVariant, SegmentRequest, Synthesizer};
pub use decision::{AudioDecision, CodecChoice, DecisionSet, SubtitleDecision, VideoDecision};
pub use negotiate::{negotiate, requires_transcode};
pub use paths::StreamPaths;
pub use profile::TranscodeProfile;
pub use registry::{ProcessControl, ProfileRegistry};
pub use source::{AudioStream, Resolution, SourceMedia, SubtitleStream, VideoStream};
