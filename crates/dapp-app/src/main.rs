//! Terminal client for the sample token dApp.
//!
//! Loads the configuration, initialises the configured wallet-auth adapter
//! and then reads one command per line from stdin. Each command renders the
//! current page again.

use anyhow::{Context, Result};
use clap::Parser;
use dapp_config::Config;
use dapp_views::Route;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod output;

use app::{App, Flow};
use output::Display;

/// Command-line arguments for the dApp client
#[derive(Parser, Debug)]
#[command(name = "dapp")]
#[command(about = "Mint, trade and rent sample tokens from the terminal")]
#[command(version)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "DAPP_CONFIG", default_value = "config/dapp.toml")]
	config: PathBuf,

	/// Log level used when RUST_LOG is not set
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Page to show first
	#[arg(short, long, default_value = "/")]
	route: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	// Load environment variables from .env file if it exists
	let _ = dotenvy::dotenv();

	let args = Args::parse();
	init_logging(&args.log_level);
	info!("Started dapp client");

	let path = args.config.to_string_lossy().to_string();
	let config = Config::from_file(&path)
		.await
		.with_context(|| format!("Failed to load configuration from {path}"))?;
	info!(
		chain_id = config.chain.chain_id,
		chain = %config.chain.display_name,
		adapter = %config.auth.primary,
		"Loaded configuration"
	);

	let mut app = App::new(&config).context("Failed to set up the session")?;
	let route: Route = match args.route.parse() {
		Ok(route) => route,
		Err(never) => match never {},
	};
	app.start(route).await;
	Display::info("Type 'help' for the list of commands");

	run(&mut app).await
}

/// Reads commands until `quit` or end of input.
async fn run(app: &mut App) -> Result<()> {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();

	loop {
		print!("> ");
		std::io::stdout().flush()?;

		let Some(line) = lines.next_line().await? else {
			debug!("End of input");
			break;
		};

		match commands::parse(&line) {
			Ok(Some(command)) => {
				if app.handle(command).await == Flow::Quit {
					break;
				}
			},
			Ok(None) => {},
			Err(e) => {
				let _ = e.print();
			},
		}
	}

	info!("Stopped dapp client");
	Ok(())
}

/// Logs go to stderr so that pages on stdout stay readable.
fn init_logging(level: &str) {
	use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(true)
				.with_thread_ids(false)
				.compact(),
		)
		.with(env_filter)
		.init();
}
