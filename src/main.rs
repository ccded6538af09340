use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::Arc;

use scorecard_cli::cli::{Cli, Commands, commands};
use scorecard_cli::scorecard::{EndpointClient, HttpEndpointClient, SyncCoordinator};
use scorecard_cli::store::SqliteStore;
use scorecard_cli::store::repository::settings;
use scorecard_cli::{init_coordinator, init_store, record_store};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("scorecard-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting scorecard-cli");

    // Initialize the global record store once
    let store = Arc::new(SqliteStore::open().await?);
    init_store(store.clone());

    // Endpoint is optional: without one, submissions stay pending until a
    // sync pass after it has been configured
    let client: Option<Arc<dyn EndpointClient>> =
        match store.get_setting(settings::ENDPOINT_URL).await? {
            Some(endpoint) => {
                info!("Using endpoint: {}", endpoint);
                Some(Arc::new(HttpEndpointClient::new(endpoint)))
            }
            None => {
                info!("No endpoint configured");
                None
            }
        };
    init_coordinator(SyncCoordinator::new(store, client));

    let result = match cli.command {
        Commands::New(args) => commands::new_command(args).await,
        Commands::History(args) => commands::history_command(args).await,
        Commands::Show(args) => commands::show_command(args).await,
        Commands::Sync => commands::sync_command().await,
        Commands::Delete(args) => commands::delete_command(args).await,
        Commands::Draft(command) => commands::draft_command(command).await,
        Commands::Config(command) => commands::config_command(command).await,
    };

    record_store().close().await;
    result
}
