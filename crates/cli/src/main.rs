//! Sithwatch: follows a dark-jedis lineage from the terminal.
//!
//! Scroll with `up` / `down` on standard input and leave with `quit`. When no
//! feed file is configured, location records (`{"id": .., "name": ..}`) are
//! read from standard input as well.

use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sithwatch_core::ScrollDirection;
use sithwatch_tracker::{EntityFetcher, HttpEntityFetcher, LocationFeed, NdjsonLocationFeed, StaticEntityFetcher, Tracker, TrackerConfig, TrackerError, TrackerEvent};
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{info, warn};

mod control;
mod render;

use control::Input;

/// Command line arguments. Flags override the configuration file.
#[derive(Parser, Debug)]
#[command(name = "sithwatch")]
#[command(about = "Track a dark-jedis lineage and the monitored subject's location")]
struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Entity id loaded into the top position
	#[arg(long)]
	seed: Option<u64>,

	/// Root URL of the record service
	#[arg(long, value_name = "URL")]
	base_url: Option<String>,

	/// Newline-delimited JSON location feed
	#[arg(long, value_name = "PATH")]
	feed: Option<PathBuf>,

	/// Serve records from a JSON array file instead of the record service
	#[arg(long, value_name = "PATH")]
	fixtures: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	fn tracker_config(&self) -> Result<TrackerConfig, sithwatch_tracker::ConfigError> {
		let mut config = match &self.config {
			Some(path) => TrackerConfig::load(path)?,
			None => TrackerConfig::default(),
		};
		if let Some(seed) = self.seed {
			config.seed = seed;
		}
		if let Some(base_url) = &self.base_url {
			config.fetch.base_url.clone_from(base_url);
		}
		if let Some(feed) = &self.feed {
			config.feed.path = Some(feed.clone());
		}
		config.validate()?;
		Ok(config)
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	let config = args.tracker_config().context("invalid configuration")?;
	info!(seed = config.seed, base_url = %config.fetch.base_url, "starting sithwatch");

	let fetcher: Arc<dyn EntityFetcher> = match &args.fixtures {
		Some(path) => {
			let records = tokio::fs::read_to_string(path).await.with_context(|| format!("reading fixtures {}", path.display()))?;
			Arc::new(StaticEntityFetcher::from_json(&records).context("decoding fixtures")?)
		}
		None => Arc::new(HttpEntityFetcher::new(&config.fetch)?),
	};

	let (controls_tx, mut controls) = mpsc::unbounded_channel();
	let (feed, stdin_locations) = match &config.feed.path {
		Some(path) => {
			let file = tokio::fs::File::open(path).await.with_context(|| format!("opening feed {}", path.display()))?;
			info!(path = %path.display(), "reading locations from file");
			(Box::new(NdjsonLocationFeed::new(BufReader::new(file))) as Box<dyn LocationFeed>, None)
		}
		None => {
			let (tx, rx) = mpsc::unbounded_channel();
			(Box::new(rx) as Box<dyn LocationFeed>, Some(tx))
		}
	};
	// Detached: a pending stdin read must not hold up runtime shutdown.
	std::thread::Builder::new()
		.name("sithwatch-control".into())
		.spawn(move || {
			if let Err(error) = control::route(std::io::stdin().lock(), controls_tx, stdin_locations) {
				tracing::warn!(%error, "control input failed");
			}
		})
		.context("spawning control reader")?;

	let tracker = Tracker::start(&config, fetcher, feed);
	let mut events = tracker.subscribe();
	print_frame(&tracker)?;

	let mut interrupted = false;
	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {
				interrupted = true;
				break;
			}
			input = controls.recv() => match input {
				Some(Input::Scroll(direction)) => {
					if after_scroll(direction, tracker.scroll(direction)).is_break() {
						break;
					}
				}
				Some(Input::Quit) | None => break,
				Some(Input::Location(_) | Input::Blank) => {}
			},
			event = events.recv() => match event {
				Ok(TrackerEvent::WindowChanged(_) | TrackerEvent::WarningsChanged(_) | TrackerEvent::LocationChanged(_)) | Err(RecvError::Lagged(_)) => print_frame(&tracker)?,
				Err(RecvError::Closed) => break,
			},
		}
	}

	let report = if interrupted { tracker.abort().await } else { tracker.stop().await };
	info!(exit = ?report.exit(), "sithwatch stopped");
	Ok(())
}

/// A full queue drops the request; only a stopped tracker ends the session.
fn after_scroll(direction: ScrollDirection, result: Result<bool, TrackerError>) -> ControlFlow<()> {
	match result {
		Ok(true) => ControlFlow::Continue(()),
		Ok(false) => {
			info!(%direction, "button disabled");
			ControlFlow::Continue(())
		}
		Err(TrackerError::Busy) => {
			warn!(%direction, "tracker busy, scroll dropped");
			ControlFlow::Continue(())
		}
		Err(TrackerError::Stopped) => ControlFlow::Break(()),
	}
}

fn print_frame(tracker: &Tracker) -> std::io::Result<()> {
	let mut stdout = std::io::stdout().lock();
	writeln!(stdout, "{}", render::render(&tracker.snapshot()))?;
	stdout.flush()
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("SITHWATCH_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("warn,sithwatch=debug")
		} else {
			EnvFilter::new("warn,sithwatch=info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
