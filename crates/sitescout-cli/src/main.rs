mod explore;
mod text_surface;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sitescout")]
#[command(about = "Find sites on a map, inspect them and save them to lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for sites around a place and draw the map
    Search {
        /// Place name or site id
        term: String,
    },
    /// Fetch one site's detail payload and print it as JSON
    Detail {
        /// Site id (the `xid` of a search result)
        id: String,
    },
    /// Search, select a marker and optionally add it to the term's list
    Explore {
        /// Place name or site id; also names the list for `--add`
        term: String,
        /// Site id to activate (defaults to the first result)
        #[arg(long)]
        select: Option<String>,
        /// Add the selected site to the list named after the term
        #[arg(long)]
        add: bool,
        /// Act as this user instead of reading the session file
        #[arg(long, env = "SITESCOUT_EMAIL")]
        email: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = sitescout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!(
        api_base_url = %config.api_base_url,
        env = %config.env,
        stale_selection = %config.stale_selection,
        "sitescout starting"
    );

    match cli.command {
        Commands::Search { term } => explore::run_search(&config, &term).await,
        Commands::Detail { id } => explore::run_detail(&config, &id).await,
        Commands::Explore {
            term,
            select,
            add,
            email,
        } => {
            explore::run_explore(
                &config,
                &term,
                select.as_deref(),
                add,
                email.as_deref(),
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests;
