mod api;
mod config;
mod context;
mod error;
mod extract;
mod refresh;
mod sources;
mod store;
mod strategy;
mod types;

#[cfg(test)]
mod testutil;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::routes::router;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::Result;

#[tokio::main]
async fn main() {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let ctx = ServiceContext::from_config(&cfg).await?;
    info!(
        backend = ?cfg.store_backend,
        sports = ?cfg.sports,
        "Service context ready",
    );

    // Held for the process lifetime.
    let _scheduler = refresh::start(&ctx).await?;

    let app = router(ctx);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
