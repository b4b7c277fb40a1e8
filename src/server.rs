//! Proxy endpoints fronting the market-data and news upstreams.
//!
//! These are the only wire contracts the dashboard exposes: `/quotes`,
//! `/quotes/{id}` and `/news`. Quote failures surface as a 502 with an
//! `{error}` body; news failures degrade to placeholder articles with a
//! success status because the dashboard treats news as decoration.

use crate::market_data::{MarketDataProvider, NewsProvider, fallback_headlines};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

pub struct ApiState {
    pub market: Arc<dyn MarketDataProvider>,
    pub news: Arc<dyn NewsProvider>,
    /// Coin ids the batch quote endpoint serves.
    pub coin_ids: Vec<String>,
}

pub fn app_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/quotes", get(list_quotes))
        .route("/quotes/{id}", get(coin_detail))
        .route("/news", get(news))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: Arc<ApiState>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Serving proxy API on http://{addr}");

    axum::serve(listener, app_router(state))
        .await
        .context("Server error")
}

fn upstream_error(message: &str, err: anyhow::Error) -> Response {
    error!(error = %err, "{message}");
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": message })),
    )
        .into_response()
}

async fn list_quotes(State(state): State<Arc<ApiState>>) -> Response {
    match state.market.fetch_quotes(&state.coin_ids).await {
        Ok(quotes) => Json(quotes).into_response(),
        Err(e) => upstream_error("Failed to fetch cryptocurrency data", e),
    }
}

async fn coin_detail(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Response {
    match state.market.fetch_detail(&id).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => upstream_error("Failed to fetch coin data", e),
    }
}

async fn news(State(state): State<Arc<ApiState>>) -> Response {
    // News failures never produce an error response.
    let articles = state
        .news
        .fetch_headlines()
        .await
        .unwrap_or_else(|_| fallback_headlines());
    Json(articles).into_response()
}
