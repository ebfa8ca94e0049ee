mod commands;
mod render;

use clap::{Parser, Subcommand};
use findgold_search::client::DEFAULT_BACKEND_URL;
use findgold_search::{BackendClient, DEFAULT_RADIUS_KM};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "findgold")]
#[command(about = "FindGold command line interface")]
struct Cli {
    /// Base URL of the FindGold backend proxy
    #[arg(long, global = true, env = "FINDGOLD_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Print normalized JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find gold panning spots around a city
    Search {
        city: String,
        /// Search radius in kilometres (capped at 300)
        #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
        radius: u32,
    },
    /// Free-form geological reading of a photo (file, URL or data URL)
    AnalyzeImage { image: String },
    /// Identify rock types and their gold potential on a photo
    Rocks { image: String },
    /// Analyse a river section photo
    River {
        image: String,
        /// River name used in the prompt
        #[arg(long)]
        name: String,
    },
    /// Geological context of a place
    Geology { location: String },
    /// Trace the probable gold line on a river photo
    GoldLine { image: String },
    /// Suggest French city names for a partial input
    Suggest {
        text: String,
        /// Override the geo.api.gouv.fr base URL
        #[arg(long, env = "FINDGOLD_GEO_API_URL")]
        geo_api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let backend = || {
        BackendClient::with_base_url(&cli.backend_url)
            .map_err(|e| anyhow::anyhow!("failed to build backend client: {e}"))
    };

    match &cli.command {
        Commands::Search { city, radius } => {
            commands::run_search(&backend()?, city, *radius, json).await?;
        }
        Commands::AnalyzeImage { image } => {
            commands::run_analyze_image(&backend()?, image, json).await?;
        }
        Commands::Rocks { image } => commands::run_rocks(&backend()?, image, json).await?,
        Commands::River { image, name } => {
            commands::run_river(&backend()?, image, name, json).await?;
        }
        Commands::Geology { location } => {
            commands::run_geology(&backend()?, location, json).await?;
        }
        Commands::GoldLine { image } => commands::run_gold_line(&backend()?, image, json).await?,
        Commands::Suggest { text, geo_api_url } => {
            commands::run_suggest(geo_api_url.as_deref(), text, json).await?;
        }
    }

    Ok(())
}
