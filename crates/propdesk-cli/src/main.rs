//! propdesk - command-line admin for the agency site's managed collections.
//!
//! Lists, adds, edits, shows/hides and deletes events, webinars,
//! newsletters and testimonials, reading through the local cache.

mod commands;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use propdesk_core::{
    AgencyStores, CacheManager, Config, HttpResourceClient, MemoryStorage, SlotStorage, SystemClock,
};

use commands::{Command, USAGE};

/// Directory for daily log files; unset means stderr only
const LOG_DIR_ENV: &str = "PROPDESK_LOG_DIR";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir.trim(), "propdesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let no_cache = args.iter().any(|a| a == "--no-cache");
    args.retain(|a| a != "--no-cache");

    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    let client = HttpResourceClient::new(config.base_url()?)?;
    let storage: Arc<dyn SlotStorage> = if no_cache {
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(CacheManager::new(config.cache_dir()?)?)
    };
    info!(base_url = client.base_url(), no_cache, "propdesk starting");

    let stores = AgencyStores::new(
        config.store_config(),
        client,
        storage,
        Arc::new(SystemClock),
    );

    if let Err(e) = commands::run(command, &stores).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
