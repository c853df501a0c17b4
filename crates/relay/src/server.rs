//! The relay's HTTP surface.
//!
//! Endpoints:
//!
//! - `GET  /auth/google`             — 302 to the Google consent screen
//! - `GET  /oauth2callback`          — code exchange, stores tokens
//! - `POST /api/calendar/free-busy`  — busy intervals for the primary calendar
//!
//! Built on Axum. CORS is permissive: the relay serves a widget embedded on
//! arbitrary customer pages.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::google::CalendarProvider;
use crate::token::TokenStore;

/// Relay port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 4000;

/// Shared state for the relay handlers.
pub struct RelayState {
    pub provider: Arc<dyn CalendarProvider>,
    pub tokens: Arc<TokenStore>,
}

type SharedState = Arc<RelayState>;

/// The port to bind, from `PORT` or the default.
pub fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Build the relay router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/auth/google", get(auth_handler))
        .route("/oauth2callback", get(callback_handler))
        .route("/api/calendar/free-busy", post(free_busy_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn run(state: SharedState, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Calendar relay listening");
    axum::serve(listener, build_router(state)).await
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn auth_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let url = state.provider.auth_url();
    (StatusCode::FOUND, [(header::LOCATION, url)])
}

#[derive(Deserialize)]
struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
}

async fn callback_handler(
    State(state): State<SharedState>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    let Some(code) = params.code else {
        warn!("OAuth callback arrived without a code");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed");
    };

    match state.provider.exchange_code(&code).await {
        Ok(tokens) => {
            state.tokens.set(tokens);
            info!("Tokens acquired successfully");
            (
                StatusCode::OK,
                "Authentication successful! You can close this tab.",
            )
        }
        Err(e) => {
            warn!(error = %e, "Error retrieving access token");
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest {
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

async fn free_busy_handler(
    State(state): State<SharedState>,
    Json(request): Json<FreeBusyRequest>,
) -> axum::response::Response {
    let Some(tokens) = state.tokens.get() else {
        return (StatusCode::UNAUTHORIZED, "Not authenticated").into_response();
    };

    let (Some(start_time), Some(end_time)) = (request.start_time, request.end_time) else {
        return (
            StatusCode::BAD_REQUEST,
            "startTime and endTime are required",
        )
            .into_response();
    };

    match state
        .provider
        .free_busy(&tokens, &start_time, &end_time)
        .await
    {
        Ok(busy) => Json(busy).into_response(),
        Err(e) => {
            warn!(error = %e, "Error fetching free-busy information");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch calendar data",
            )
                .into_response()
        }
    }
}
