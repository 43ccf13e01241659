use color_eyre::eyre::{Result, eyre};
use hibachi_pager::{config::Config, database::Database};

pub async fn run(config: &Config) -> Result<()> {
    let database = Database::new(&config.database)
        .await
        .map_err(|e| eyre!("Failed to connect to database: {}", e))?;
    database.log_connection_info();

    database.migrate().await.map_err(|e| eyre!("Failed to apply migrations: {}", e))?;
    Ok(())
}
