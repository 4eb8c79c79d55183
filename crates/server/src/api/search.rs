//! Search API handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use magnetcloud_core::{parse_category, SearchError, UnifiedResult};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "Results")]
    pub results: Vec<UnifiedResult>,
    /// Adapter name -> failure message, for partially failed searches.
    #[serde(rename = "Errors", skip_serializing_if = "HashMap::is_empty")]
    pub errors: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A search failure rendered as `{ "error": ... }` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub SearchError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            SearchError::NoBackends => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = %status, error = %self.0, "Search request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/search?q=<text>&category=<id|all>
///
/// Search every configured backend and return merged, deduplicated results.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let category = parse_category(params.category.as_deref().unwrap_or_default())?;
    let text = params.q.unwrap_or_default();

    let outcome = state.search().search(&text, category).await?;

    Ok(Json(SearchResponse {
        results: Arc::unwrap_or_clone(outcome.results),
        errors: outcome.adapter_errors,
    }))
}
