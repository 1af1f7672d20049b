//! # mc-av
//!
//! External transcoder plumbing for mediacast.
//!
//! - **Discovery** ([`discover_backend`]): locate the transcoder binary,
//!   read its version and keep the configured accelerators it supports.
//! - **Command execution** ([`ToolCommand`]): async process launch that a
//!   cancellation token can stop.
//! - **Fallback runner** ([`TranscodeRunner`]): run command variants in
//!   order until one succeeds, and stop them when a profile is removed.

pub mod command;
pub mod discovery;
pub mod runner;

pub use command::{ToolCommand, ToolOutput};
pub use discovery::{
    check_transcoder, detect_hwaccels, detect_version, discover_backend, locate_transcoder,
    parse_hwaccels, resolve_accelerators, ToolInfo,
};
pub use runner::{RunOutcome, TranscodeRunner};
