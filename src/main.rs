mod cli;

use mediacast::{config, engine::read_json, Engine};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, SessionArgs};
use mc_transcode::{CapabilityProfile, CommandVariant, SegmentRequest, SourceMedia};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediacast=trace,mc_transcode=trace,mc_av=debug,mc_core=debug".to_string()
        } else {
            "mediacast=info,mc_transcode=info,mc_av=info,mc_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Negotiate { session } => negotiate(&session, cli.config.as_deref()),
        Commands::Plan {
            session,
            segment,
            stream_type,
            index,
            json,
        } => {
            let request = segment.map(|segment| SegmentRequest {
                segment: Some(segment),
                stream_type,
                index,
            });
            plan(&session, cli.config.as_deref(), request, json)
        }
        Commands::Run { session } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run(&session, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediacast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_session(session: &SessionArgs) -> Result<(SourceMedia, CapabilityProfile)> {
    let source: SourceMedia = read_json(&session.media)?;
    let caps: CapabilityProfile = read_json(&session.client)?;
    Ok((source, caps))
}

fn negotiate(session: &SessionArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let engine = Engine::from_config(&config)?;
    let (source, caps) = load_session(session)?;

    let profile = engine.open(source, caps)?;
    println!("{}", serde_json::to_string_pretty(profile.decisions())?);
    engine.close(profile.id())?;
    Ok(())
}

fn plan(
    session: &SessionArgs,
    config_path: Option<&Path>,
    request: Option<SegmentRequest>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let engine = Engine::from_config(&config)?;
    let (source, caps) = load_session(session)?;

    let profile = engine.open(source, caps)?;
    let variants = match request {
        Some(request) => engine.plan_segment(&request, &profile).ok_or_else(|| {
            anyhow::anyhow!("Incomplete segment request: --stream-type and --index are required")
        }),
        None => Ok(engine.plan(&profile)),
    };
    engine.close(profile.id())?;
    let variants = variants?;

    if json {
        println!("{}", serde_json::to_string_pretty(&variants)?);
    } else {
        println!("Profile: {} ({})", profile.id(), profile.kind());
        for (i, variant) in variants.iter().enumerate() {
            println!("{}. [{}] {}", i + 1, accelerator_label(variant), variant);
        }
    }

    Ok(())
}

fn accelerator_label(variant: &CommandVariant) -> String {
    variant
        .accelerator
        .as_ref()
        .map_or_else(|| "software".to_string(), ToString::to_string)
}

async fn run(session: &SessionArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let engine = Engine::from_config(&config)?;
    let (source, caps) = load_session(session)?;

    let profile = engine.open(source, caps)?;
    if profile.kind() == mc_core::ProfileKind::File {
        println!("Direct play: {}", profile.source().path.display());
        engine.close(profile.id())?;
        return Ok(());
    }

    let outcome = tokio::select! {
        outcome = engine.run(&profile) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping transcode");
            engine.close(profile.id())?;
            return Ok(());
        }
    };

    // The profile may already be gone if the run was stopped.
    let _ = engine.close(profile.id());
    let outcome = outcome?;
    println!(
        "Transcode finished with variant {} ({})",
        outcome.variant + 1,
        outcome
            .accelerator
            .as_ref()
            .map_or_else(|| "software".to_string(), ToString::to_string)
    );
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tool = mc_av::check_transcoder(&config.transcode);

    let status = if tool.available { "✓" } else { "✗" };
    print!("{} {}", status, tool.name);
    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }
    println!();

    if !tool.hwaccels.is_empty() {
        println!("  Hardware acceleration: {}", tool.hwaccels.join(", "));
    }

    println!();
    if tool.available {
        println!("All required tools are available!");
    } else {
        println!("The transcoder is missing. Install ffmpeg or set transcode.transcoder_path.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    println!("  Cache dir: {}", config.paths.cache_dir.display());
    println!("  Data dir: {}", config.paths.data_dir.display());
    println!(
        "  Hardware accelerators: {}",
        config.transcode.hardware_accelerators.len()
    );
    println!(
        "  Segment duration: {}s",
        config.transcode.segment_duration_secs
    );

    Ok(())
}
