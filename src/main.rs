//! SANI dialogue router
//!
//! Hosts intent-driven dialogue sessions for the JKN membership portal and
//! reaches the chat and NLU oracles through the SANI relay.

mod api;
mod catalog;
mod config;
mod dialogue;
mod handoff;
mod history;
mod oracle;
mod runtime;

use api::{create_router, AppState};
use config::SaniConfig;
use handoff::MemoryHandoffStore;
use oracle::{ChatOracle, IntentOracle, LoggingOracle, RelayClient};
use runtime::{SessionManager, SessionSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sani_router=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = SaniConfig::from_env();
    tracing::info!(
        api_base = %config.api_base,
        history_window = config.history_window,
        oracle_timeout_secs = config.oracle_timeout.as_secs(),
        handoff_max_bytes = config.handoff_max_bytes,
        session_idle_secs = config.session_idle_timeout.map(|t| t.as_secs()),
        "Configuration loaded"
    );
    if config.handoff_max_bytes == 0 {
        tracing::warn!("Handoff slot disabled; captured templates will not be stored");
    }

    // Oracle clients share one HTTP connection pool
    let relay = Arc::new(RelayClient::new(&config.api_base, config.oracle_timeout)?);
    tracing::info!(base_url = relay.base_url(), "Oracle relay client ready");
    let chat: Arc<dyn ChatOracle> = Arc::new(LoggingOracle::new(relay.clone(), "chat"));
    let intent: Arc<dyn IntentOracle> = Arc::new(LoggingOracle::new(relay, "parse-intent"));

    let handoff = Arc::new(MemoryHandoffStore::new(config.handoff_max_bytes));

    // Create application state
    let state = AppState::new(SessionManager::new(
        chat,
        intent,
        handoff,
        SessionSettings {
            history_window: config.history_window,
            idle_timeout: config.session_idle_timeout,
        },
    ));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true).deflate(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("SANI dialogue router listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
