//! Binary entrypoint for the Questforge CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` with documented defaults
//! - `validate` - load the config and fail on any invalid constant
//! - `restock` - open the world store and regenerate the cart once
//! - `players` - list stored player ids
//! - `player <id>` - dump one player record as JSON
//!
//! See the library crate docs for module-level details: `questforge::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use questforge::config::Config;
use questforge::game::GameService;

#[derive(Parser)]
#[command(name = "questforge")]
#[command(about = "Progression and economy core for a persistent multiplayer text RPG")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config.toml
    Init,
    /// Load and validate the configuration, then exit
    Validate,
    /// Regenerate the world cart and print the listing
    Restock,
    /// List stored player ids
    Players,
    /// Dump a player record as JSON
    Player {
        /// Player id to inspect
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            info!("wrote default configuration to {}", cli.config);
        }
        Commands::Validate => {
            let config = Config::load(&cli.config).await?;
            info!(
                "configuration valid: {} rarity tiers sum to {:.1}%",
                questforge::game::Rarity::ALL.len(),
                config.rarity_weights.sum()
            );
        }
        Commands::Restock => {
            let config = Config::load(&cli.config).await?;
            let service = GameService::new(config)?;
            let cart = service.restock_cart(chrono::Utc::now()).await?;
            println!("{}", cart.render());
        }
        Commands::Players => {
            let config = Config::load(&cli.config).await?;
            let service = GameService::new(config)?;
            for id in service.list_players()? {
                println!("{id}");
            }
        }
        Commands::Player { id } => {
            let config = Config::load(&cli.config).await?;
            let service = GameService::new(config)?;
            let record = service.player(&id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
