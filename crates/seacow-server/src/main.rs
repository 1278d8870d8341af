//! Seacow: chat relay for county economic questions.

use std::sync::Arc;

use seacow_augment::{SearchConfig, StatisticsConfig};
use seacow_chat::LLMConfig;
use seacow_core::{mask_secret, SeacowConfig};
use seacow_runtime::Orchestrator;
use seacow_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("Seacow: chat relay with live statistics and web search");
    println!();
    println!("Usage: seacow [command]");
    println!();
    println!("Commands:");
    println!("  (none)    Start the server");
    println!("  help      Show this help message");
    println!();
    println!("Configuration is read from the environment and an optional .env file.");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'seacow help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = SeacowConfig::from_env();
    let llm = LLMConfig::from_env();
    let statistics = StatisticsConfig::from_env();
    let search = SearchConfig::from_env();

    match &search.api_key {
        Some(k) => info!("BRAVE_SEARCH_API_KEY detected: {}", mask_secret(k)),
        None => info!("BRAVE_SEARCH_API_KEY not set; web search disabled"),
    }
    if statistics.bea_api_key.is_none() {
        info!("BEA_API_KEY not set; GDP lookups disabled");
    }

    let orchestrator = Orchestrator::from_config(&config, llm, statistics, search)?;
    let state = Arc::new(AppState::new(orchestrator));
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Seacow server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
