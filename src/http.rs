//! HTTP surface.
//!
//! Serves the feed as JSON: the event history, owned tokens, the loading
//! indicator and explorer links. Mint calls can be built here but are never
//! signed; signing belongs to the wallet.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::feed::{FeedSnapshot, NftFeed};
use crate::mint::build_mint_call;
use crate::types::{MintRequest, MintedEvent, MoveCall, OwnedToken};

/// HTTP server state.
#[derive(Clone)]
pub struct HttpState {
    pub version: String,
    pub startup_time: i64,
    pub feed: Arc<NftFeed>,
}

impl HttpState {
    pub fn new(feed: Arc<NftFeed>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            startup_time: chrono::Utc::now().timestamp(),
            feed,
        }
    }
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

#[derive(Serialize, Deserialize)]
pub struct ExplorerResponse {
    pub digest: String,
    pub url: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error mapped onto a status code and a JSON body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl ToString) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn upstream(err: &anyhow::Error) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

async fn health_handler(State(state): State<Arc<HttpState>>) -> Json<HealthResponse> {
    let now = chrono::Utc::now().timestamp();
    let uptime = now - state.startup_time;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: uptime,
    })
}

async fn feed_handler(State(state): State<Arc<HttpState>>) -> Json<FeedSnapshot> {
    Json(state.feed.snapshot().await)
}

async fn refresh_events_handler(
    State(state): State<Arc<HttpState>>,
) -> Result<Json<Vec<MintedEvent>>, ApiError> {
    state
        .feed
        .refresh_events()
        .await
        .map(Json)
        .map_err(|err| ApiError::upstream(&err))
}

async fn owned_handler(
    State(state): State<Arc<HttpState>>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<OwnedToken>>, ApiError> {
    state
        .feed
        .refresh_owned(&owner)
        .await
        .map(Json)
        .map_err(|err| ApiError::upstream(&err))
}

async fn explorer_handler(
    State(state): State<Arc<HttpState>>,
    Path(digest): Path<String>,
) -> Json<ExplorerResponse> {
    let url = state.feed.config().explorer_url(&digest);
    Json(ExplorerResponse { digest, url })
}

async fn mint_call_handler(
    State(state): State<Arc<HttpState>>,
    Json(request): Json<MintRequest>,
) -> Result<Json<MoveCall>, ApiError> {
    build_mint_call(state.feed.config(), &request)
        .map(Json)
        .map_err(ApiError::bad_request)
}

/// Create the HTTP router over `feed`.
pub fn create_http_router(feed: Arc<NftFeed>) -> Router {
    let state = Arc::new(HttpState::new(feed));

    Router::new()
        .route("/health", get(health_handler))
        .route("/feed", get(feed_handler))
        .route("/events/refresh", post(refresh_events_handler))
        .route("/owned/:owner", get(owned_handler))
        .route("/explorer/:digest", get(explorer_handler))
        .route("/mint/call", post(mint_call_handler))
        .with_state(state)
}
