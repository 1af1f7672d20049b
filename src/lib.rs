//! Mediacast - transcode negotiation and command synthesis
//!
//! This library crate exposes the binary's wiring for integration testing.

pub mod config;
pub mod engine;

pub use engine::Engine;
