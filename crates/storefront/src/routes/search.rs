//! Search autocomplete API.

use axum::{Json, extract::{Query, State}};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::state::AppState;

/// Minimum query length before we hit the database.
const MIN_QUERY_LENGTH: usize = 2;

/// Maximum suggestions returned.
const MAX_RESULTS: i64 = 10;

/// Autocomplete query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// One autocomplete suggestion.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub image: String,
    pub url: String,
}

/// Autocomplete response body.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Product autocomplete for the navbar search box.
#[instrument(skip(state))]
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SearchResponse>> {
    let q = query.q.trim();
    if q.chars().count() < MIN_QUERY_LENGTH {
        return Ok(Json(SearchResponse {
            results: Vec::new(),
        }));
    }

    let products = ProductRepository::new(state.pool())
        .autocomplete(q, MAX_RESULTS)
        .await?;

    let results = products
        .into_iter()
        .map(|p| SearchResult {
            id: p.id.as_i32(),
            name: p.name.clone(),
            price: p.final_price().display(),
            image: p.image_url.clone(),
            url: p.url(),
        })
        .collect();

    Ok(Json(SearchResponse { results }))
}
