//! TazaNet
//!
//! Content-safety gate for a child-facing search box. Queries typed or
//! spoken into the shell are checked against the blacklist and a toxicity
//! model before the search is opened.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tazanet_gate::cli::Cli;
use tazanet_gate::{
    run_shell, spawn_age_producer, BrowserDispatcher, Gate, GateConfig, LineFaceSource,
    LogDispatcher, QueuedRecognizer, SearchDispatcher, TracingAnnouncer,
};
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    info!("Starting TazaNet");

    let config = GateConfig::load(&cli.config, &cli)?;
    info!(
        backend = ?config.classifier.backend,
        translate = config.translator.enabled,
        age = %config.age.initial,
        blacklist_terms = config.blacklist.terms.len(),
        "Configuration loaded"
    );

    let dispatcher: Arc<dyn SearchDispatcher> = if cli.no_browser {
        Arc::new(LogDispatcher)
    } else {
        Arc::new(BrowserDispatcher)
    };
    let gate =
        Gate::from_config(&config, Arc::new(TracingAnnouncer))?.with_dispatcher(dispatcher);

    // Subscribe before starting so the LOADING notification is reported
    let status = gate.spawn_status_reporter();
    let loading = gate.start(Gate::loader(&config)?)?;

    let sampler = match &cli.faces {
        Some(path) => {
            let source = LineFaceSource::open(path).await?;
            Some(spawn_age_producer(
                Box::new(source),
                config.age.heuristic(),
                Arc::clone(gate.age_signal()),
                config.age.sample_interval(),
            ))
        }
        None => None,
    };

    let recognizer = match &cli.transcripts {
        Some(path) => QueuedRecognizer::from_file(path)?,
        None => QueuedRecognizer::default(),
    };

    run_shell(
        &gate,
        &recognizer,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    if let Some(sampler) = sampler {
        sampler.abort();
    }
    status.abort();
    loading.abort();

    info!("TazaNet stopped");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("tazanet=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tazanet=info"))
    };

    // Logs go to stderr so they don't interleave with shell replies
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
