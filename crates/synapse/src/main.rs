use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use synapse::engine::{EngineError, Orchestrator};
use synapse::models::SynapseConfig;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "synapse",
    about = "Synapse - turns delivery disruptions into ROI-scored action plans"
)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Seed for reproducible estimates, overriding [estimator].seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one disruption and print the solution JSON
    Resolve {
        /// Free-text description of the disruption
        text: String,

        /// Resolve the same text this many times
        #[arg(long, default_value_t = 1)]
        repeat: u32,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Resolve the demo scenarios twice each and print a summary
    Demo {
        #[arg(long)]
        pretty: bool,
    },
    /// Resolve each stdin line until EOF or Ctrl-C, with the predictor running
    Watch,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::from_default_env();
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = synapse::load_config(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.estimator.seed = cli.seed;
    }

    let estimator = synapse::build_estimator(&config);
    let orchestrator = Arc::new(
        synapse::build_orchestrator(&config, Arc::clone(&estimator))
            .context("Failed to build orchestrator")?,
    );

    match cli.command {
        Command::Resolve {
            text,
            repeat,
            pretty,
        } => {
            for _ in 0..repeat.max(1) {
                let solution = orchestrator
                    .resolve(&text)
                    .await
                    .context("Resolution failed")?;
                print_json(&solution, pretty)?;
            }
        }
        Command::Demo { pretty } => run_demo(&orchestrator, pretty).await?,
        Command::Watch => {
            let predictor = synapse::build_predictor(&config, Arc::clone(&orchestrator), estimator)?;
            run_watch(&config, &orchestrator, predictor).await?;
        }
    }

    if let Some(path) = &config.cache.snapshot_path {
        let saved = synapse::save_snapshot(orchestrator.cache(), path)?;
        tracing::info!(path = %path, saved, "Saved cache snapshot");
    }

    Ok(())
}

async fn run_demo(orchestrator: &Orchestrator, pretty: bool) -> Result<()> {
    for text in synapse::DEMO_SCENARIOS {
        for _ in 0..2 {
            let solution = orchestrator
                .resolve(text)
                .await
                .with_context(|| format!("Resolution failed: {text}"))?;
            print_json(&solution, pretty)?;
        }
    }

    let summary = serde_json::json!({
        "metrics": orchestrator.metrics()?,
        "cache_status": orchestrator.cache_status()?,
        "cache_info": orchestrator.cache_info()?,
        "optimization_stats": orchestrator.optimization_stats()?,
        "top_approaches": orchestrator.top_approaches(5)?,
    });
    print_json(&summary, pretty)
}

async fn run_watch(
    config: &SynapseConfig,
    orchestrator: &Orchestrator,
    predictor: synapse::predictor::Predictor,
) -> Result<()> {
    let cancel = predictor.cancel_token();
    let predictor_handle = if config.predictor.enabled {
        let runner = predictor.clone();
        Some(tokio::spawn(async move { runner.run().await }))
    } else {
        tracing::info!("Predictor disabled");
        None
    };

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match orchestrator.resolve(&line).await {
                    Ok(solution) => print_json(&solution, false)?,
                    Err(EngineError::InvalidInput(reason)) => {
                        tracing::debug!(reason = %reason, "Skipping blank line");
                    }
                    Err(e) => return Err(e).context("Resolution failed"),
                }
            }
        }
    }

    cancel.cancel();
    if let Some(handle) = predictor_handle {
        handle
            .await
            .context("Predictor task panicked")?
            .map_err(|e| anyhow::anyhow!("Predictor error: {e}"))?;
    }
    if config.predictor.enabled {
        print_json(&predictor.stats()?, false)?;
    }
    Ok(())
}
