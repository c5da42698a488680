//! Main entry point for the FIX-MATE backend service.
//!
//! This binary runs the marketplace REST API together with the engine's
//! background loop (notification relay and storage cleanup). It uses a
//! modular architecture with pluggable implementations for storage, auth,
//! and notifications, selected by TOML configuration.

use clap::Parser;
use fixmate_config::Config;
use fixmate_core::{EngineBuilder, MarketEngine, MarketFactories};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod auth;
mod server;

/// Command-line arguments for the backend service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the engine with all registered implementations
/// 5. Runs the HTTP API and the engine loop until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started FIX-MATE backend");

	// Load configuration
	let config = Config::from_file(args.config.to_str().unwrap()).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	// Build the engine with registered implementations
	let engine = build_engine(config.clone()).await?;
	let engine = Arc::new(engine);

	let api_config = config.api.clone();
	let api_engine = Arc::clone(&engine);

	// Run the API server and the engine loop concurrently
	let engine_task = engine.run();
	let api_task = server::start_server(api_config, api_engine);

	tokio::select! {
		result = engine_task => {
			tracing::info!("Engine finished");
			result?;
		}
		result = api_task => {
			tracing::info!("API server finished");
			result?;
		}
	}

	tracing::info!("Stopped FIX-MATE backend");
	Ok(())
}

/// Collects every registered implementation into the builder's factory maps.
fn market_factories() -> MarketFactories {
	MarketFactories {
		storage_factories: fixmate_storage::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
		auth_factories: fixmate_auth::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
		notifier_factories: fixmate_notify::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
	}
}

/// Builds the engine from configuration and the registered factories.
async fn build_engine(config: Config) -> Result<MarketEngine, Box<dyn std::error::Error>> {
	let builder = EngineBuilder::new(config);
	Ok(builder.build(market_factories()).await?)
}
