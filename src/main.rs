use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use display_feeds::cli::{Cli, Commands};
use display_feeds::config::{Config, FeedStore};
use display_feeds::services::FeedService;
use display_feeds::sources::FeedTypeRegistry;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = FeedStore::load(&config.store_path)
        .with_context(|| format!("loading feed store from {}", config.store_path))?;

    let service = FeedService::new(Arc::new(FeedTypeRegistry::new()));

    match cli.command {
        Commands::Sources => {
            if store.sources.is_empty() {
                println!("No feed sources configured.");
                return Ok(());
            }
            for source in &store.sources {
                println!(
                    "  {} [{}] -> {}",
                    source.id, source.feed_type_id, source.supported_output
                );
            }
        }

        Commands::Form { source_id } => {
            let source = store
                .source(&source_id)
                .with_context(|| format!("unknown feed source: {}", source_id))?;
            let fields = service.admin_form_options(source)?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }

        Commands::Options { source_id, name } => {
            let source = store
                .source(&source_id)
                .with_context(|| format!("unknown feed source: {}", source_id))?;
            match service.config_options(source, &name).await? {
                Some(options) => println!("{}", serde_json::to_string_pretty(&options)?),
                None => println!("Unknown config field '{}' for source {}.", name, source_id),
            }
        }

        Commands::Fetch { feed_id } => {
            let feed = store
                .feed(&feed_id)
                .with_context(|| format!("unknown feed: {}", feed_id))?;
            let payload = service.data(feed).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
