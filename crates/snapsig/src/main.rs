use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snapsig::hotkey::{spawn_listener, HotkeyCombo};
use snapsig::models::SnapsigConfig;
use snapsig::pipeline::Analyzer;
use snapsig::vision::VisionError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "snapsig",
    about = "Screenshot a chart on a hotkey, ask a vision model for an up/down/wait signal"
)]
struct Cli {
    /// Path to configuration file (defaults to config/snapsig.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wait for the hotkey and analyze the screen on each press (default)
    Run,
    /// Verify the API key and service reachability, then exit
    Check,
    /// Capture and analyze once, print the journal record
    Once,
    /// Analyze an existing PNG instead of capturing the screen
    Analyze {
        #[arg(long)]
        image: PathBuf,
    },
    /// Print the most recent journal records
    History {
        #[arg(long, default_value_t = 10)]
        last: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = snapsig::load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Check => {
            checked_client(&config).await?;
            println!(
                "OK: {} reachable, model {}",
                config.api.models_endpoint, config.api.model
            );
            Ok(())
        }
        Command::Once => {
            let (analyzer, _cancel) = connected_analyzer(&config).await?;
            let record = analyzer.run_cycle().await.context("Analysis failed")?;
            println!("{}", serde_json::to_string(&record)?);
            Ok(())
        }
        Command::Analyze { image } => {
            let png = std::fs::read(&image)
                .with_context(|| format!("Failed to read image: {}", image.display()))?;
            let (analyzer, _cancel) = connected_analyzer(&config).await?;
            let record = analyzer
                .analyze_png(&png, &image)
                .await
                .context("Analysis failed")?;
            println!("{}", serde_json::to_string(&record)?);
            Ok(())
        }
        Command::History { last } => {
            let records = snapsig::journal::tail_records(config.output.log_path(), last)?;
            for record in records {
                println!("{}", serde_json::to_string(&record)?);
            }
            Ok(())
        }
    }
}

/// Startup check: a missing key or an unreachable service ends the process
/// before any listener starts.
async fn checked_client(config: &SnapsigConfig) -> Result<snapsig::vision::OpenRouterClient> {
    snapsig::startup_check(&config.api).await.map_err(|e| match e {
        VisionError::MissingApiKey => anyhow::anyhow!(
            "API key is not set (api.key in config or {})",
            snapsig::API_KEY_ENV
        ),
        other => anyhow::anyhow!("Cannot connect to vision service: {other}"),
    })
}

async fn connected_analyzer(
    config: &SnapsigConfig,
) -> Result<(Arc<Analyzer>, CancellationToken)> {
    let client = checked_client(config).await?;
    let cancel = CancellationToken::new();
    let analyzer = snapsig::build_analyzer(config, Arc::new(client), cancel.clone())?;
    Ok((Arc::new(analyzer), cancel))
}

async fn run(config: SnapsigConfig) -> Result<()> {
    let combo = HotkeyCombo::parse(&config.hotkey.combo)?;
    let (analyzer, cancel) = connected_analyzer(&config).await?;

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    spawn_listener(combo.clone(), tx)?;

    // Handle shutdown signals
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
        shutdown.cancel();
    });

    println!("Running... Press {combo} to analyze screen");
    analyzer
        .serve(rx, cancel)
        .await
        .map_err(|e| anyhow::anyhow!("Listener error: {e}"))?;
    Ok(())
}
