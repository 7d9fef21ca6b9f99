use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use crate::catalog::{filter_products, validate_new, validate_patch, FilterCriteria};
use crate::db::{self, CreateProductRequest, Product, ProductPatch};
use crate::AppState;

/// List products, filtered server-side by the query parameters.
///
/// GET /api/products?name=&min_price=&max_price=&discount=&sale_status=
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = db::list_products(&state.db).await?;
    Ok(Json(filter_products(&products, &criteria, Utc::now())))
}

/// Create a product.
///
/// POST /api/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validate_new(&request)?;

    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: request.name,
        price: request.price,
        discount: request.discount.unwrap_or(0.0),
        sale_end: request.sale_end.unwrap_or_default(),
        created_at: Utc::now().to_rfc3339(),
    };

    db::insert_product(&state.db, &product).await?;

    info!(id = %product.id, name = %product.name, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product. The sale-window invariant is checked on
/// the merged result, not just the patch.
///
/// PUT /api/products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let current = db::get_product(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    validate_patch(&current, &patch)?;

    let mut updated = current;
    patch.apply_to(&mut updated);

    if !db::update_product(&state.db, &updated).await? {
        // Deleted between the read and the write; surface the same 404.
        return Err(ApiError::not_found("Product not found"));
    }

    info!(id = %updated.id, "product updated");

    Ok(Json(updated))
}

/// Delete a product.
///
/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !db::delete_product(&state.db, &id).await? {
        return Err(ApiError::not_found("Product not found"));
    }

    info!(id = %id, "product deleted");

    Ok(StatusCode::OK)
}
