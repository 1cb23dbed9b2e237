use anyhow::Result;
use clap::Parser;
use conclave_server::config::ServerConfig;
use conclave_server::routes;
use conclave_server::state::AppState;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    #[arg(long, default_value = "questions")]
    questions_dir: PathBuf,

    #[arg(long, default_value = ".conclave/conclave.db")]
    db: PathBuf,
}

use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = ServerConfig::from_env();

    init_logging(&cfg.log_level);

    tracing::info!(
        event = "server_start",
        config_dir = ?args.config_dir,
        questions_dir = ?args.questions_dir,
        db = ?args.db,
        bind = %cfg.bind_addr,
    );
    if cfg.auth_secret.is_none() {
        tracing::warn!("auth secret not configured, authenticated endpoints will fail");
    }

    let app_config = conclave_core::config::load_app_config(&args.config_dir)?;
    let questions = conclave_core::questions::load_all_questions(&args.questions_dir);

    if let Some(parent) = args.db.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = conclave_core::storage::Store::open(&args.db)?;
    store.init_schema()?;

    let state = AppState::new(store, app_config, questions, cfg.clone());
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
