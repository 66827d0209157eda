//! trend-ingest runner — Binary Entrypoint
//! Reads newline-delimited JSON events from a file (or stdin), ingests each one
//! and prints one JSON receipt per line. Tasks are drained by a channel worker.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_ingest::ingest::config::load_config_default;
use trend_ingest::ingest::runner::run_lines;
use trend_ingest::ingest::sinks::CountingPersister;
use trend_ingest::ingest::worker::{spawn_task_worker, task_channel};
use trend_ingest::metrics::Metrics;
use trend_ingest::Ingestor;

fn env_flag(name: &str) -> bool {
    std::env::var(name).ok().is_some_and(|v| v == "1")
}

/// Logs go to stderr so stdout stays machine-readable.
/// RUST_LOG overrides the filter; TREND_INGEST_LOG_JSON=1 switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ingest=info,warn"));

    if env_flag("TREND_INGEST_LOG_JSON") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init();
    }
}

fn open_input(arg: Option<String>) -> Result<Box<dyn BufRead>> {
    match arg {
        Some(path) if path != "-" => {
            let f = File::open(&path).with_context(|| format!("opening input {path}"))?;
            Ok(Box::new(BufReader::new(f)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = if env_flag("TREND_INGEST_METRICS") {
        Some(Metrics::init()?)
    } else {
        None
    };

    let cfg = load_config_default()?;
    let persister = Arc::new(CountingPersister::new());
    let (queue, receiver) = task_channel();
    let worker = spawn_task_worker(receiver);

    let ingestor = Ingestor::from_config(&cfg)
        .with_persister(persister.clone())
        .with_queue(Arc::new(queue));

    let input = open_input(std::env::args().nth(1))?;
    let stats = run_lines(&ingestor, input, io::stdout().lock())?;

    // Dropping the ingestor drops the last queue sender, letting the worker finish.
    drop(ingestor);
    let processed = worker.await.context("task worker panicked")?;

    info!(
        target: "ingest",
        ok = stats.ok,
        failed = stats.failed,
        persisted = persister.count(),
        processed,
        "run finished"
    );

    if let Some(m) = metrics {
        eprintln!("{}", m.render());
    }
    Ok(())
}
