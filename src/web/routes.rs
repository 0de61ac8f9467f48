use crate::error::AppError;
use crate::secrets::{Issuer, Redeemer, Redemption};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use cachette_types::{CreateSecretResponse, Secret, TokenInfo};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<Issuer>,
    pub redeemer: Arc<Redeemer>,
    /// Public base URL used to build share links
    pub public_url: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create a new shared secret.
///
/// Issues a scoped token for the submitted payload and returns the token,
/// its computed expiration, and the share URL.
pub async fn create_secret(
    State(state): State<AppState>,
    Json(secret): Json<Secret>,
) -> Result<Json<CreateSecretResponse>, AppError> {
    let issued = state.issuer.issue(&secret).await?;
    let url = share_url(&state.public_url, &issued.token);

    // The token never goes to the logs; the response is its only copy
    info!("Created share link for secret '{}'", secret.name);

    Ok(Json(CreateSecretResponse {
        url,
        token: issued.token,
        expiration: issued.expiration,
    }))
}

/// Show a share token's metadata (existence and expiry check)
pub async fn show_secret(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TokenInfo>, AppError> {
    match state.redeemer.peek_metadata(&token).await? {
        Redemption::Found(info) => Ok(Json(info)),
        Redemption::NotFound => Err(AppError::NotFound),
    }
}

/// Show the secret contents behind a share token
pub async fn show_secret_contents(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Secret>, AppError> {
    match state.redeemer.read_contents(&token).await? {
        Redemption::Found(secret) => Ok(Json(secret)),
        Redemption::NotFound => Err(AppError::NotFound),
    }
}

/// Build the informational share URL for a token
fn share_url(public_url: &str, token: &str) -> String {
    format!("{}/show/{}", public_url.trim_end_matches('/'), token)
}

/// Create the web router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/new", post(create_secret))
        .route("/show/{token}", get(show_secret))
        .route("/show/{token}/contents", get(show_secret_contents))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
