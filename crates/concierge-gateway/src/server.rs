//! HTTP service boundary: /ask and /health

use crate::service::ConciergeFactory;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use concierge_agent::{AgentHandle, AgentStatus, LifecycleConfig};
use concierge_core::{Config, ConversationId};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

pub struct AppState {
    pub handle: AgentHandle,
    /// Bounded worker pool: caps concurrent model round-trips so the
    /// acceptor keeps taking requests while queries are in flight.
    pub query_permits: Semaphore,
}

impl AppState {
    pub fn new(handle: AgentHandle, max_concurrent_queries: usize) -> Arc<Self> {
        Arc::new(Self {
            handle,
            query_permits: Semaphore::new(max_concurrent_queries.max(1)),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
    /// Optional conversation key. Only meaningful when memory is not
    /// shared; absent, each request gets a fresh conversation.
    #[serde(default)]
    pub conversation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let factory = ConciergeFactory::new(config.clone());
    let handle = AgentHandle::new(
        factory,
        LifecycleConfig {
            max_init_wait: config.max_init_wait,
            build_timeout: config.build_timeout,
            chat_timeout: config.chat_timeout,
        },
    );

    // Warm up off the request path before accepting traffic.
    handle.ensure_started();

    let state = AppState::new(handle, config.max_concurrent_queries);
    let app = router(state);

    let bind_addr: SocketAddr = format!("{}:{}", config.bind.to_addr(), config.port).parse()?;

    info!("Concierge v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Model: {}", config.llm_model);
    info!("  Shared memory: {}", config.shared_memory);
    info!("  Max init wait: {:?}", config.max_init_wait);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> impl IntoResponse {
    let _permit = match state.query_permits.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(AskResponse {
                    response: "Service is shutting down.".to_string(),
                }),
            )
                .into_response();
        }
    };

    debug!("processing query: {}", payload.query);

    let conversation = payload
        .conversation
        .map(ConversationId::from)
        .unwrap_or_else(|| ConversationId::from(Uuid::new_v4().to_string()));

    let outcome = state.handle.query(&conversation, &payload.query).await;

    Json(AskResponse {
        response: outcome.reply_text(),
    })
    .into_response()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.handle.status();

    let mut details = serde_json::json!({ "agent": status.as_str() });
    match &status {
        AgentStatus::Initializing { elapsed_seconds } => {
            details["elapsed_seconds"] = serde_json::json!(elapsed_seconds);
        }
        AgentStatus::Failed { reason } => {
            details["error"] = serde_json::json!(reason);
        }
        _ => {}
    }

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "details": details,
    }))
}
