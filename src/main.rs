//! Gemini Chat - single-page chat front-end for the Gemini API
//!
//! Serves a chat page, forwards user turns to the model and keeps a
//! per-session, in-memory history of past conversations.

mod api;
mod config;
mod llm;
mod runtime;
mod session;

use api::{create_router, AppState};
use config::ChatConfig;
use llm::{GeminiService, LoggingService};
use runtime::SessionManager;
use session::SessionController;
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
                .unwrap_or_else(|_| "gemini_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // A missing credential stops startup here
    let config = ChatConfig::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");

    let gemini = GeminiService::new(
        config.api_key.clone(),
        &config.model,
        config.gateway.as_deref(),
    )?;
    let llm = Arc::new(LoggingService::new(Arc::new(gemini)));

    let controller = SessionController::new(llm, config.temperature);
    let sessions = Arc::new(SessionManager::new(controller, config.session_idle));
    sessions.start_idle_sweeper();
    let state = AppState::new(sessions);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Gemini Chat listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
