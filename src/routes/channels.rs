use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::{ChannelsErrorResponse, ChannelsResponse};
use crate::AppState;

/// GET /api/iptv - Verified channel catalog
///
/// Served from the catalog cache when fresh; otherwise the whole
/// aggregate + verify pipeline runs before responding.
pub async fn get_channels(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog.get_catalog().await {
        Ok(lookup) => {
            tracing::info!(
                "Serving {} channels (cached: {})",
                lookup.catalog.entries.len(),
                lookup.cached
            );

            Json(ChannelsResponse {
                success: true,
                data: lookup.catalog.entries.clone(),
                cached: lookup.cached,
                timestamp: lookup.catalog.fetched_at.timestamp_millis(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to build channel catalog: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChannelsErrorResponse {
                    success: false,
                    message: "Failed to load the channel list".to_string(),
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
