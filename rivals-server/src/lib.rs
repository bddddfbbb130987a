//! HTTP surface for competitor discovery.
//!
//! | route                       | body                                   |
//! |-----------------------------|----------------------------------------|
//! | `POST /api/findcompetitors` | `{ "websiteurl", "summaryText"? }`     |
//! | `POST /api/scrapereddit`    | `{ "websiteurl" }`                     |
//! | `GET /health`               | -                                      |
//!
//! Success is `{ "results": [...] }`; failures are `{ "error": "..." }` with
//! 400 for a missing URL and 500 for everything else.
mod error;
mod routes;

pub use error::ApiError;
pub use routes::{AppState, build_router};

use anyhow::Context;
use rivals_config::RivalsConfig;
use rivals_exa::SearchProvider;
use std::sync::Arc;

/// Bind `server.bind` and serve until Ctrl-C.
pub async fn serve(config: &RivalsConfig, provider: Arc<dyn SearchProvider>) -> anyhow::Result<()> {
    let state = AppState::from_config(config, provider);
    let app = build_router(state, &config.server.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        request_timeout_secs = config.server.request_timeout_secs,
        mention_domain = %config.mentions.domain,
        "server.listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("server.shutdown");
}
