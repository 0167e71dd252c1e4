use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod app;
mod config;
mod db;
mod error;
mod extractors;
mod riders;
mod state;
mod trips;

#[cfg(test)]
mod fakes;

use crate::{config::AppConfig, state::AppState};

#[derive(Debug, Parser)]
#[command(name = "rider-service", about = "Rider records and trip delegation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Load riders from a CSV export (or a `.json` array of rows)
    Import { file: PathBuf },
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "rider_service=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let db = db::connect(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = AppState::init(&config, db)?;
            app::serve(app::build_app(state), &config).await
        }
        Command::Import { file } => {
            let store = riders::repo::PgRiderStore::new(db);
            riders::import::import_file(&store, &file).await?;
            Ok(())
        }
    }
}
