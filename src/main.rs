//! Character Cards API entry point.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use character_cards::api::{self, AppState};
use character_cards::config::Config;
use character_cards::metrics;
use character_cards::CharacterCatalog;

/// Character Cards API server.
#[derive(Parser, Debug)]
#[command(name = "character-cards")]
#[command(about = "Serve character cards and their media over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true, env = "VERBOSE")]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// HTTP server port (overrides PORT).
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Character JSON file (overrides CHARACTERS_FILE).
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Check configuration validity and the character file.
    CheckConfig,

    /// Print one random character.
    Random,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env feeds both clap (VERBOSE) and the log filter (RUST_LOG)
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("character_cards=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(args.port, args.data).await,
        Some(Command::Random) => cmd_random(args.port, args.data).await,
        Some(Command::Serve) | None => cmd_serve(args.port, args.data).await,
    }
}

/// Load configuration and apply CLI overrides.
fn load_config(port: Option<u16>, data: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data) = data {
        config.characters_file = data;
    }

    config.validate()?;
    Ok(config)
}

/// Run the HTTP server.
async fn cmd_serve(port: Option<u16>, data: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(port, data)?;

    info!("Character file: {}", config.characters_file.display());
    info!("Media URLs: {}", config.media_url_policy());
    if config.cors_origins().is_empty() {
        info!("CORS: any origin");
    } else {
        info!("CORS: {}", config.cors_origins().join(", "));
    }

    let mut state = AppState::from_config(&config);

    if config.metrics_enabled {
        let handle = metrics::install_prometheus()?;
        state = state.with_prometheus(handle);
    } else {
        metrics::init_metrics();
    }

    // Surface a broken data file at startup; requests still re-read it.
    if let Err(e) = state.catalog.load().await {
        warn!("Character file not loadable yet: {}", e);
    }

    api::serve(state, &config).await?;
    Ok(())
}

/// Check configuration validity.
async fn cmd_check_config(port: Option<u16>, data: Option<PathBuf>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CHARACTER CARDS - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match load_config(port, data) {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(e);
        }
    };

    print!("Loading character file... ");
    let catalog = CharacterCatalog::new(config.characters_file.clone());
    let characters = match catalog.load().await {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Character file unavailable"));
        }
    };

    let mut seen = HashSet::new();
    let duplicates: Vec<i64> = characters
        .iter()
        .filter_map(|c| c.numeric_id())
        .filter(|id| !seen.insert(*id))
        .collect();
    let without_id = characters.iter().filter(|c| c.numeric_id().is_none()).count();
    let with_music = characters.iter().filter(|c| c.defeat_music().is_some()).count();
    let with_video = characters.iter().filter(|c| c.defeat_video().is_some()).count();

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen: {}", config.bind_addr());
    println!("  Character File: {}", config.characters_file.display());
    println!("  Characters: {}", characters.len());
    println!("  With defeat music: {}", with_music);
    println!("  With defeat video: {}", with_video);
    println!("  Public Dir: {}", config.public_dir.display());
    println!("  Music Dir: {}", config.music_dir.display());
    println!("  Video Dir: {}", config.video_dir.display());
    println!("  Media URLs: {}", config.media_url_policy());
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });

    if characters.is_empty() {
        println!("  WARNING: character file is empty; /api/character/random will fail");
    }
    if without_id > 0 {
        println!("  WARNING: {} characters have no integer id; /api/character/:id skips them", without_id);
    }
    if !duplicates.is_empty() {
        println!("  WARNING: duplicate ids {:?}; lookups return the first match", duplicates);
    }

    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print one random character as pretty JSON.
async fn cmd_random(port: Option<u16>, data: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(port, data)?;
    let catalog = CharacterCatalog::new(config.characters_file.clone());

    let character = catalog.random(config.base_url.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&character)?);

    Ok(())
}
