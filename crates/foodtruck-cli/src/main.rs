mod fetch;
mod render;
mod repl;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "foodtruck-cli")]
#[command(about = "Find San Francisco food trucks by name, cuisine or distance")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch vendor data and report how many records passed validation
    Fetch,
    /// Run one search and print the results
    Search {
        /// Match against name, food items, facility type and status
        #[arg(long)]
        text: Option<String>,
        /// Geocode this address and search around it
        #[arg(long)]
        address: Option<String>,
        /// Search radius in miles (clamped to the configured range)
        #[arg(long)]
        radius: Option<f64>,
        /// Include map marker coordinates in the output
        #[arg(long)]
        show_all: bool,
        /// Print the result snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive search: each line updates the live query
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = foodtruck_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Fetch) => fetch::run_fetch(&config).await,
        Some(Commands::Search {
            text,
            address,
            radius,
            show_all,
            json,
        }) => {
            let request = search::SearchRequest {
                text: text.as_deref(),
                address: address.as_deref(),
                radius,
                show_all,
                json,
            };
            search::run_search(&config, &request).await
        }
        Some(Commands::Repl) | None => repl::run_repl(&config).await,
    }
}
