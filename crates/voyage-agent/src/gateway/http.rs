//! HTTP gateway: POST /api/messages → engine turn → activity list.
//!
//! Protocol-level problems (wrong content type, malformed body, missing
//! identifiers) map to HTTP errors; business failures inside the dialog
//! never do. Each request is limited by a per-turn timeout.

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::activity::{Activity, ActivityKind, InboundActivity};
use crate::engine::Engine;

/// Shared state for the HTTP server: engine + per-turn timeout.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<Engine>,
    pub turn_timeout_secs: u64,
}

/// Response body: outbound activities in send order.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub activities: Vec<Activity>,
}

/// Response body for the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub turn_timeout_secs: u64,
}

/// Validate the inbound activity; returns an HTTP error for missing
/// identifiers or an empty message text.
pub fn validate_activity(activity: &InboundActivity) -> Result<(), (StatusCode, String)> {
    if activity.id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "id must be non-empty".to_string()));
    }
    if activity.session_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "session_id must be non-empty".to_string(),
        ));
    }
    if activity.kind == ActivityKind::Message
        && activity
            .text
            .as_deref()
            .is_none_or(|text| text.trim().is_empty())
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "text must be non-empty for message activities".to_string(),
        ));
    }
    Ok(())
}

async fn handle_messages(
    State(state): State<GatewayState>,
    Json(activity): Json<InboundActivity>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    validate_activity(&activity)?;
    let timeout_secs = state.turn_timeout_secs;
    let output = match tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        state.engine.run_turn(activity),
    )
    .await
    {
        Ok(Ok(output)) => output,
        Ok(Err(error)) => return Err((StatusCode::INTERNAL_SERVER_ERROR, error.to_string())),
        Err(_) => {
            return Err((
                StatusCode::GATEWAY_TIMEOUT,
                format!("turn timed out after {timeout_secs}s"),
            ));
        }
    };
    Ok(Json(TurnResponse {
        activities: output.activities,
    }))
}

async fn handle_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        turn_timeout_secs: state.turn_timeout_secs,
    })
}

/// Build the gateway router (POST /api/messages).
pub fn router(engine: Arc<Engine>, turn_timeout_secs: u64) -> Router {
    let state = GatewayState {
        engine,
        turn_timeout_secs,
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/messages", post(handle_messages))
        .with_state(state)
}

/// Run the HTTP server; binds to `bind_addr` (e.g. `0.0.0.0:3978`).
/// Graceful shutdown on Ctrl+C (SIGINT) and SIGTERM (Unix); in-flight
/// requests complete before exit.
pub async fn run_http(engine: Arc<Engine>, bind_addr: &str, turn_timeout_secs: u64) -> Result<()> {
    let app = router(engine, turn_timeout_secs);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(
        "gateway listening on {} (turn_timeout={}s, Ctrl+C/SIGTERM to stop)",
        bind_addr,
        turn_timeout_secs
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let ctrl_c = tokio::signal::ctrl_c();
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to listen for SIGTERM");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for Ctrl+C");
    }
}
