use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use color_eyre::eyre::{Result, eyre};
use hibachi_pager::{
    api::{ApiServer, AppState},
    config::Config,
    database::{CatalogRepository, Database, PgExecutor},
    pagination::{PageLimits, Paginator},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub fn register_commands(app: Command) -> Command {
    app.about("Serve the paginated booking API").arg(
        Arg::new("bind")
            .long("bind")
            .short('b')
            .help("Bind address for the server, overriding api.bind")
            .action(ArgAction::Set)
            .value_parser(value_parser!(SocketAddr)),
    )
}

pub async fn handle_command(matches: &ArgMatches, config: &Config) -> Result<()> {
    let addr = match matches.get_one::<SocketAddr>("bind") {
        Some(addr) => *addr,
        None => config
            .api
            .bind
            .parse()
            .map_err(|e| eyre!("Invalid api.bind address {}: {}", config.api.bind, e))?,
    };

    let database = Arc::new(
        Database::new(&config.database)
            .await
            .map_err(|e| eyre!("Failed to connect to database: {}", e))?,
    );
    database.log_connection_info();

    let executor = Arc::new(PgExecutor::from_database(&database));
    let paginator = Paginator::new(PageLimits::from(&config.pagination));
    let repository = Arc::new(CatalogRepository::new(executor, paginator));
    let state = AppState::new(repository).with_database(database);

    let server = Arc::new(ApiServer::new(addr));
    let mut handle = {
        let server = server.clone();
        tokio::spawn(async move { server.run(state).await })
    };

    tokio::select! {
        result = &mut handle => {
            result.map_err(|e| eyre!("API server task failed: {}", e))??;
            return Ok(());
        },
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
            server.shutdown();
        },
    }

    handle.await.map_err(|e| eyre!("API server task failed: {}", e))??;
    info!("API server stopped");
    Ok(())
}
