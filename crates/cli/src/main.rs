//! Margin command-line front end.
//!
//! Loads a file, runs one debounced refresh through the annotation pipeline
//! with the reference table analyzer, and prints the resulting markers.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::Parser;
use margin_annotation::TableAnalyzer;
use margin_editor::{AnnotationPipeline, ApplyOutcome, LineSource, MarginConfig, TickOutcome};
use ropey::Rope;
use tracing::{debug, info};

/// Upper bound on waiting for the worker's answer.
const RESULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Annotate a file line by line.
#[derive(Parser, Debug)]
#[command(name = "margin")]
#[command(about = "Annotate a file with the reference table analyzer")]
struct Args {
	/// File to annotate
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Override the debounce interval
	#[arg(long, value_name = "N")]
	debounce_ms: Option<u64>,

	/// Print the annotation map as JSON instead of markers
	#[arg(long)]
	json: bool,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	let config = load_config(&args)?;
	let buffer = read_buffer(&args.file)?;
	info!(file = %args.file.display(), lines = buffer.len_lines(), "margin.start");

	let mut pipeline = AnnotationPipeline::new(TableAnalyzer::reference(), &config);
	let outcome = annotate(&mut pipeline, &buffer).await;
	let shutdown = pipeline.shutdown(config.worker.shutdown_timeout());
	let outcome = outcome?;

	let mut stdout = std::io::stdout().lock();
	if args.json {
		serde_json::to_writer_pretty(&mut stdout, pipeline.view().annotations()).context("failed to write JSON")?;
		writeln!(stdout)?;
	} else {
		let lines = LineSource::lines(&buffer);
		for marker in pipeline.view().markers(&lines) {
			writeln!(stdout, "{}: {}", marker.line + 1, marker.label)?;
		}
	}
	debug!(?outcome, "margin.done");

	shutdown.context("annotation worker did not shut down cleanly")?;
	Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<MarginConfig> {
	let mut config = match &args.config {
		Some(path) => MarginConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))?,
		None => MarginConfig::default(),
	};
	if let Some(debounce_ms) = args.debounce_ms {
		config.pipeline.debounce_ms = debounce_ms;
		config.validate().context("invalid --debounce-ms")?;
	}
	Ok(config)
}

fn read_buffer(path: &Path) -> anyhow::Result<Rope> {
	let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
	Rope::from_reader(BufReader::new(file)).with_context(|| format!("failed to read {}", path.display()))
}

/// Drives one debounced refresh and waits for the view to reflect it.
async fn annotate(pipeline: &mut AnnotationPipeline<TableAnalyzer>, buffer: &Rope) -> anyhow::Result<ApplyOutcome> {
	pipeline.on_buffer_changed(Instant::now());

	let generation = loop {
		if let Some(deadline) = pipeline.next_deadline() {
			tokio::time::sleep_until(deadline.into()).await;
		}
		match pipeline.tick(Instant::now(), buffer)? {
			TickOutcome::Submitted(generation) => break generation,
			TickOutcome::Cleared(generation) => {
				debug!(generation, "margin.blank");
				return Ok(ApplyOutcome::Cleared);
			}
			TickOutcome::Waiting => continue,
			TickOutcome::Idle => bail!("refresh was never scheduled"),
		}
	};

	let wait = async {
		while let Some(outcome) = pipeline.next_event().await {
			if pipeline.view().generation() >= generation {
				return Some(outcome);
			}
		}
		None
	};
	match tokio::time::timeout(RESULT_TIMEOUT, wait).await {
		Ok(Some(ApplyOutcome::Failed)) => bail!("analysis of generation {generation} failed"),
		Ok(Some(outcome)) => Ok(outcome),
		Ok(None) => bail!("annotation worker exited before delivering a result"),
		Err(_) => bail!("no result within {RESULT_TIMEOUT:?}"),
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("MARGIN_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("margin_editor=trace,margin_scheduler=trace,debug")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
