pub mod bookings;
pub mod migrate;
pub mod serve;

use clap::Command;
use color_eyre::eyre::Result;
use hibachi_pager::config::Config;

/// Register all application commands
pub fn register_commands(app: Command) -> Command {
    app.subcommand(serve::register_commands(Command::new("serve")))
        .subcommand(Command::new("migrate").about("Apply pending database migrations"))
        .subcommand(bookings::register_commands(Command::new("bookings")))
}

/// Handle all application commands
pub async fn handle_commands(matches: clap::ArgMatches, config: &Config) -> Result<()> {
    match matches.subcommand() {
        Some(("serve", serve_matches)) => serve::handle_command(serve_matches, config).await,
        Some(("migrate", _)) => migrate::run(config).await,
        Some(("bookings", bookings_matches)) => {
            bookings::handle_command(bookings_matches, config).await
        },
        _ => {
            println!("Please specify a subcommand. Use --help for more information.");
            Ok(())
        },
    }
}
