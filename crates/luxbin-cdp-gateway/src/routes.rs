/*
[INPUT]:  Browser HTTP requests for onramp buy options and quotes
[OUTPUT]: camelCase JSON responses or structured {error} bodies
[POS]:    HTTP server layer - stateless onramp proxy handlers
[UPDATE]: When adding proxy routes or changing error translation
*/

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use luxbin_cdp_adapter::{BuyOptionsQuery, BuyQuoteRequest, CdpClient, CdpError};
use serde_json::{Value, json};
use tracing::{error, info, warn};

/// Shared handler state; the client's key material is read-only
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: Arc<CdpClient>,
}

impl AppState {
    pub fn new(client: CdpClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Build the proxy router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/onramp/buy-options", get(buy_options))
        .route("/api/onramp/buy-quote", post(buy_quote))
        .with_state(state)
}

/// Error response rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub CdpError);

impl From<CdpError> for ApiError {
    fn from(err: CdpError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.http_status();
        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "onramp proxy request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "onramp proxy request rejected");
        }
        (status, Json(json!({ "error": self.0.public_message() }))).into_response()
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/onramp/buy-options?country&subdivision&networks
pub async fn buy_options(
    State(state): State<AppState>,
    query: Result<Query<BuyOptionsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|e| CdpError::InvalidRequest(e.body_text()))?;
    let options = state.client.get_buy_options(&query).await?;
    Ok(Json(options))
}

/// POST /api/onramp/buy-quote
///
/// Validation runs before the upstream call; an incomplete body answers 400.
pub async fn buy_quote(
    State(state): State<AppState>,
    body: Result<Json<BuyQuoteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body.map_err(|e| CdpError::InvalidRequest(e.body_text()))?;
    req.validate()?;

    info!(
        country = req.country.as_deref().unwrap_or_default(),
        purchase_currency = req.purchase_currency.as_deref().unwrap_or_default(),
        "requesting buy quote"
    );
    let quote = state.client.create_buy_quote(&req).await?;
    Ok(Json(quote))
}
