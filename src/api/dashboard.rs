use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use super::error::ApiError;
use crate::catalog::{summarize, Summary};
use crate::db;
use crate::AppState;

/// Dashboard summary counts, always over the unfiltered product set.
///
/// GET /api/dashboard
pub async fn summary(State(state): State<Arc<AppState>>) -> Result<Json<Summary>, ApiError> {
    let products = db::list_products(&state.db).await?;
    Ok(Json(summarize(&products, Utc::now())))
}
