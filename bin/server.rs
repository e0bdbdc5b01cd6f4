// PIMS - Web Server
// Dashboard + submission forms with Axum

use anyhow::{Context, Result};
use pims::{init_tracing, web, Config, Services};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Missing store credentials are fatal
    let config = Config::from_env().context("Invalid configuration")?;

    let services = Services::from_config(&config)?;
    let app = web::router(Arc::new(services));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(version = pims::VERSION, "PIMS web server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
