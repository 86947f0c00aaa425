use std::sync::Arc;

use crate::{
    config::Config,
    data::StarSystemStore,
    error::Error,
    service::{Fetcher, StarSystemProvider},
};

/// Loads `.env` when present, then reads the configuration from the environment
pub fn load_config() -> Result<Config, Error> {
    dotenvy::dotenv().ok();

    Ok(Config::from_env()?)
}

/// Opens the database file for the configured mode and runs migrations
pub async fn connect_to_database(config: &Config) -> Result<StarSystemStore, Error> {
    std::fs::create_dir_all(&config.data_dir)?;

    let path = config.database_path();
    let store = StarSystemStore::open(&path).await?;

    tracing::info!(
        "Opened star system database {} at schema version {}",
        path.display(),
        store.schema_version().await?
    );

    Ok(store)
}

/// Builds the provider over an opened store
pub fn build_provider(
    config: &Config,
    store: StarSystemStore,
    fetcher: Arc<dyn Fetcher>,
) -> StarSystemProvider {
    StarSystemProvider::new(store, fetcher, config.provider)
}
