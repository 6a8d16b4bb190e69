mod api;
mod config;
mod error;
mod shutdown;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use config::{Config, DEFAULT_CONFIG_FILE, EngineMode};
use error::Result;
use shutdown::shutdown_signal;
use state::AppState;

#[derive(Parser)]
#[command(name = "geotutor")]
#[command(about = "Math tutoring backend that draws with GeoGebra", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Address to bind (overrides config and GEOTUTOR_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config and GEOTUTOR_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Engine mode: render commands for the browser, or run them on a bridge
    #[arg(long, value_enum)]
    mode: Option<EngineMode>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(mode) = cli.mode {
        config.engine.mode = mode;
    }

    init_tracing(&config.log.level);
    info!(config = %cli.config.display(), mode = ?config.engine.mode, "starting geotutor v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(AppState::from_config(&config)?);
    if !state.is_managed() {
        info!("local engine mode: commands are returned to the browser");
    }
    let app = with_static(api::build_router(state.clone()), &config)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!("listening on http://{addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(err) = server.await {
        warn!("server exited with error: {err}");
    }

    if let Some(pool) = &state.engines {
        pool.close();
    }
    info!("shutdown complete");
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Serve the built frontend for any path the API does not claim.
fn with_static(app: Router, config: &Config) -> Router {
    match &config.server.static_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "serving static files");
            app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        Some(dir) => {
            warn!(dir = %dir.display(), "static_dir does not exist, not serving frontend");
            app
        }
        None => app,
    }
}
