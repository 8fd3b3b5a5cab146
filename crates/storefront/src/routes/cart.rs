//! Cart route handlers.
//!
//! Every write answers with the refreshed cart so the client never has to
//! recompute totals.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use rocky_gym_core::{CartItemId, ProductId};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::services::CartService;
use crate::state::AppState;

/// Body for POST /cart.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
}

/// Body for POST /cart/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantity {
    /// Values below one are ignored.
    pub quantity: i64,
}

/// GET /cart
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Cart>, AppError> {
    let cart = CartService::new(state.backend(), user.id).list_cart().await?;
    Ok(Json(cart))
}

/// POST /cart
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddToCart>,
) -> Result<(StatusCode, Json<Cart>), AppError> {
    // Fail with a 404 rather than a dangling row.
    state.catalog().get_product(body.product_id).await?;

    let carts = CartService::new(state.backend(), user.id);
    carts.add_to_cart(body.product_id).await?;
    Ok((StatusCode::CREATED, Json(carts.list_cart().await?)))
}

/// POST /cart/{id}
#[instrument(skip(state, user, body), fields(user = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateQuantity>,
) -> Result<Json<Cart>, AppError> {
    let cart = CartService::new(state.backend(), user.id)
        .update_quantity(id, body.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /cart/{id}
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
) -> Result<Json<Cart>, AppError> {
    let cart = CartService::new(state.backend(), user.id)
        .remove_item(id)
        .await?;
    Ok(Json(cart))
}
