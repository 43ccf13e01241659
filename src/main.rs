//! Hibachi Pager
//!
//! Command line entry point for serving the paginated booking API,
//! applying migrations and listing bookings from a terminal.

mod commands;

use clap::Command;
use hibachi_pager::{config::Config, error, metrics};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    error::install_error_handlers()?;

    let config = Config::load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    // Initialize logging
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.default_level));

    if let Some(dep_filter) = &config.logging.dependency_filter {
        let filter_string = format!("{},{}", env_filter, dep_filter);
        env_filter = EnvFilter::try_new(&filter_string).unwrap_or(env_filter);
    }

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json().with_current_span(false)).init();
    } else {
        let format = fmt::format().with_thread_ids(true).with_target(false);
        registry.with(fmt::layer().event_format(format)).init();
    }

    metrics::setup_metrics(&config);

    let base_app = Command::new("hibachi-pager")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cursor-paginated booking catalog service");

    let app = commands::register_commands(base_app);
    let matches = app.get_matches();

    commands::handle_commands(matches, &config).await?;

    info!("Execution completed successfully");
    Ok(())
}
