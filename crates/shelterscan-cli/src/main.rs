mod discover;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub(crate) use discover::DiscoverArgs;

#[derive(Debug, Parser)]
#[command(name = "shelterscan")]
#[command(about = "Find animal shelters near a location")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Locate, query both providers and list nearby shelters
    Discover(DiscoverArgs),
    /// Geocode a place name and print its coordinate
    Search {
        /// Free-text place name, e.g. "Trenton, NJ"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shelterscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Discover(args) => discover::run_discover(&config, &args).await,
        Commands::Search { text } => search::run_search(&config, &text.join(" ")).await,
    }
}

#[cfg(test)]
mod tests;
