use clap::{Args, Parser, Subcommand};
use mc_core::StreamType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediacast")]
#[command(author, version, about = "Transcode negotiation and command synthesis for media streaming")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Source descriptor and client capabilities, both JSON files.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// JSON file describing the source media and its streams
    #[arg(long, required = true)]
    pub media: PathBuf,

    /// JSON file with the client's capability profile
    #[arg(long, required = true)]
    pub client: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Negotiate per-stream decisions and print them
    Negotiate {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Print the transcoder command variants for a stream or a segment
    Plan {
        #[command(flatten)]
        session: SessionArgs,

        /// Segment name to correct instead of planning the whole stream
        #[arg(long)]
        segment: Option<String>,

        /// Stream type of the segment (video, audio, subtitle)
        #[arg(long, requires = "segment")]
        stream_type: Option<StreamType>,

        /// Video tier or track index of the segment
        #[arg(long, requires = "segment")]
        index: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Negotiate, then run the variants in fallback order
    Run {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Check that the transcoder is available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
