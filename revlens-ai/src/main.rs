//! revlens-ai - Review sentiment analysis
//!
//! Subcommands:
//! - `analyze <file.csv>`: one run, printed as a text dashboard (or JSON)
//! - `serve`: HTTP service with `POST /analyze`, `GET /health`, `GET /events`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use revlens_ai::services::TableSource;
use revlens_ai::{build_router, config, dashboard, AppState};
use revlens_common::config::{load_config, resolve_config_path, TomlConfig};
use revlens_common::events::EventBus;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Review sentiment analysis with an executive summary
#[derive(Parser, Debug)]
#[command(name = "revlens-ai", version, about)]
struct Args {
    /// Config file (default: $REVLENS_CONFIG, then <config dir>/revlens/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a CSV file with a `review` column
    Analyze {
        /// Input CSV file
        file: PathBuf,

        /// Print the full result as JSON instead of the dashboard
        #[arg(long)]
        json: bool,

        /// Report language (overrides [report].language)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Run the HTTP service
    Serve {
        /// Bind address (overrides [server].host)
        #[arg(long, env = "REVLENS_HOST")]
        host: Option<String>,

        /// Port (overrides [server].port)
        #[arg(short, long, env = "REVLENS_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config supplies the default log filter, so it is read before tracing starts
    let config_path = resolve_config_path(args.config.as_deref());
    let mut toml_config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    // Logs go to stderr so `analyze --json` output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting revlens-ai v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found, using built-in defaults"),
    }

    match args.command {
        Command::Analyze {
            file,
            json,
            language,
        } => {
            if let Some(language) = language {
                toml_config.report.language = language;
            }
            analyze(&toml_config, file, json).await
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                toml_config.server.host = host;
            }
            if let Some(port) = port {
                toml_config.server.port = port;
            }
            serve(&toml_config).await
        }
    }
}

async fn analyze(toml_config: &TomlConfig, file: PathBuf, json: bool) -> Result<()> {
    let pipeline = config::build_pipeline(toml_config, None)?;

    let run = pipeline
        .run(&TableSource::File(file.clone()))
        .await
        .with_context(|| format!("Analysis of {} failed", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", dashboard::render_dashboard(&run));
    }

    Ok(())
}

async fn serve(toml_config: &TomlConfig) -> Result<()> {
    let event_bus = EventBus::new(256);
    let pipeline = config::build_pipeline(toml_config, Some(event_bus.clone()))?;

    let state = AppState::new(pipeline, event_bus)
        .with_body_limit(toml_config.server.max_body_bytes);
    let app = build_router(state);

    let bind_addr = format!("{}:{}", toml_config.server.host, toml_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
