use std::sync::Arc;

use beacon::{
    service::{OfflineFetcher, ResolveOptions},
    startup,
};
use tracing_subscriber::EnvFilter;

/// Prints the stored record of every star system named on the command line, by system
/// address when the argument is numeric and by name otherwise. Never contacts a remote
/// authority.
#[tokio::main]
async fn main() {
    let config = startup::load_config();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = match startup::connect_to_database(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open star system database: {}", e);
            std::process::exit(1);
        }
    };
    let provider = startup::build_provider(&config, store, Arc::new(OfflineFetcher));

    let (addresses, names): (Vec<String>, Vec<String>) = std::env::args()
        .skip(1)
        .partition(|arg| arg.parse::<u64>().is_ok());
    let addresses: Vec<u64> = addresses.iter().filter_map(|a| a.parse().ok()).collect();

    let mut records = provider.resolve(&addresses, ResolveOptions::offline()).await;
    records.extend(
        provider
            .get_or_create_by_names(&names, ResolveOptions::offline())
            .await
            .into_iter()
            .filter(|record| record.system_address != 0),
    );

    for record in records {
        match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("Failed to print star system {:?}: {}", record.name, e),
        }
    }
}
