use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use color_eyre::eyre::{Result, eyre};
use hibachi_pager::{
    config::Config,
    core::types::Direction,
    database::{BookingFilter, BookingRepository, BookingSort, CatalogRepository, Database, PgExecutor},
    pagination::{PageLimits, PageRequest, Paginator},
};
use std::sync::Arc;

pub fn register_commands(app: Command) -> Command {
    app.about("Booking catalog commands").subcommand(
        Command::new("list")
            .about("Print one page of bookings as JSON")
            .arg(
                Arg::new("limit")
                    .long("limit")
                    .short('l')
                    .help("Page size (defaults to pagination.default_limit)")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(i64)),
            )
            .arg(
                Arg::new("cursor")
                    .long("cursor")
                    .short('c')
                    .help("Cursor from a previous page")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("direction")
                    .long("direction")
                    .short('d')
                    .help("Sort direction")
                    .default_value("asc")
                    .value_parser(["asc", "desc"])
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("sort")
                    .long("sort")
                    .short('s')
                    .help("Ordering column")
                    .default_value("created_at")
                    .value_parser(["created_at", "event_start"])
                    .action(ArgAction::Set),
            ),
    )
}

pub async fn handle_command(matches: &ArgMatches, config: &Config) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => list(list_matches, config).await,
        _ => {
            register_commands(Command::new("bookings")).print_help()?;
            Ok(())
        },
    }
}

async fn list(matches: &ArgMatches, config: &Config) -> Result<()> {
    let direction: Direction = matches
        .get_one::<String>("direction")
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| eyre!(e))?
        .unwrap_or_default();
    let sort: BookingSort = matches
        .get_one::<String>("sort")
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| eyre!(e))?
        .unwrap_or_default();

    let request = PageRequest {
        cursor: matches.get_one::<String>("cursor").cloned(),
        limit: matches.get_one::<i64>("limit").copied(),
        direction,
    };

    let database = Arc::new(
        Database::new(&config.database)
            .await
            .map_err(|e| eyre!("Failed to connect to database: {}", e))?,
    );
    let repository = CatalogRepository::new(
        Arc::new(PgExecutor::from_database(&database)),
        Paginator::new(PageLimits::from(&config.pagination)),
    );

    let page = repository.list_bookings(&BookingFilter::default(), sort, &request).await?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
