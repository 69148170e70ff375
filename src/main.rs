use anyhow::{Context, Result};
use clap::Parser;
use interview_studio::{create_router, AppState, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "interview-studio", about = "Interview practice recording service")]
struct Cli {
    /// Path to a configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("NATS services at {}", cfg.nats.url);
    match &cfg.capture.media_path {
        Some(path) => info!("Default capture source: file {}", path),
        None => info!("Default capture source: live pipeline"),
    }

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("HTTP server error")?;

    Ok(())
}
