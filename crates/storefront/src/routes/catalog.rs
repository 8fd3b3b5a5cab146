//! Product, supplement and exercise route handlers.
//!
//! Nothing is sold through these routes. Each item links to the gym's chat
//! with a prefilled question instead.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use rocky_gym_core::{ProductId, SupplementId};

use crate::error::AppError;
use crate::models::{Exercise, Product, Supplement};
use crate::services::Inquiry;
use crate::state::AppState;

/// GET /products
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Json<Arc<Vec<Product>>>, AppError> {
    Ok(Json(state.catalog().list_products().await?))
}

/// GET /products/{id}/inquiry
#[instrument(skip(state))]
pub async fn product_inquiry(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Inquiry>, AppError> {
    let catalog = state.catalog();
    let product = catalog.get_product(id).await?;
    Ok(Json(catalog.product_inquiry(&product)))
}

/// GET /supplements
#[instrument(skip(state))]
pub async fn supplements(
    State(state): State<AppState>,
) -> Result<Json<Arc<Vec<Supplement>>>, AppError> {
    Ok(Json(state.catalog().list_supplements().await?))
}

/// GET /supplements/{id}/inquiry
#[instrument(skip(state))]
pub async fn supplement_inquiry(
    State(state): State<AppState>,
    Path(id): Path<SupplementId>,
) -> Result<Json<Inquiry>, AppError> {
    let catalog = state.catalog();
    let supplement = catalog.get_supplement(id).await?;
    Ok(Json(catalog.supplement_inquiry(&supplement)))
}

/// GET /exercises
#[instrument(skip(state))]
pub async fn exercises(
    State(state): State<AppState>,
) -> Result<Json<Arc<Vec<Exercise>>>, AppError> {
    Ok(Json(state.catalog().list_exercises().await?))
}
