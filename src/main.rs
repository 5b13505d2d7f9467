use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faceit_overlay::api::build_router;
use faceit_overlay::api::state::AppState;
use faceit_overlay::cache::SystemClock;
use faceit_overlay::config::AppConfig;
use faceit_overlay::upstream::FaceitClient;

#[derive(Parser)]
#[command(name = "faceit-overlay")]
#[command(about = "FACEIT stats proxy with session tracking for stream overlays")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Directory with the search, overlay and test pages
        #[arg(long)]
        static_dir: Option<String>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Print the stats report for a player
    Stats {
        /// Player nickname (defaults to the configured player)
        #[arg(long)]
        username: Option<String>,
    },

    /// Search players by nickname
    Search {
        query: String,

        /// Max results
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_state(config: &AppConfig) -> Result<AppState> {
    let client =
        FaceitClient::from_config(&config.faceit).context("Failed to create FACEIT client")?;
    let state = AppState::from_config(config, Arc::new(client), Arc::new(SystemClock))?;
    Ok(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(Path::new(&cli.config));

    // Initialize tracing
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_tracing(&log_level, cli.json_logs);

    tracing::info!("Starting faceit-overlay v{}", env!("CARGO_PKG_VERSION"));

    let mut config = loaded.context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
            access_log,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(static_dir) = static_dir {
                config.server.static_dir = static_dir;
            }
            config.validate().context("Invalid configuration")?;

            let state = build_state(&config)?;
            let app = build_router(state, &config.server);
            let app = if access_log {
                app.layer(TraceLayer::new_for_http())
            } else {
                app
            };

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!(
                "Serving {} on http://{} (default player: {})",
                config.server.static_dir,
                addr,
                config.faceit.default_player
            );

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Commands::Stats { username } => {
            config.validate().context("Invalid configuration")?;
            let state = build_state(&config)?;

            let stats = state.stats.get_stats(username.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Search { query, limit } => {
            config.validate().context("Invalid configuration")?;
            let state = build_state(&config)?;

            let limit = limit.unwrap_or(state.search_limit);
            let results = state.search.search_players(&query, limit).await?;
            if results.is_empty() {
                println!("No players found for {:?}", query);
            }
            for (i, player) in results.iter().enumerate() {
                println!(
                    "{:>2}. {:<20} level {:>2}  elo {:>5}  {}",
                    i + 1,
                    player.nickname,
                    player.level,
                    player.elo,
                    player.country
                );
            }
        }
    }

    Ok(())
}
