//! Subscription route handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use rocky_gym_core::Email;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{PriceListItem, Subscription};
use crate::services::{SubscriptionService, SubscriptionStatus};
use crate::state::AppState;
use crate::supabase::AuthUser;

/// Body for POST /subscriptions.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// Title of a price list entry.
    pub subscription_type: String,
}

fn member_email(user: &AuthUser) -> Result<&Email, AppError> {
    user.email
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("account has no email address".to_string()))
}

/// GET /subscriptions/prices
#[instrument(skip(state))]
pub async fn prices(State(state): State<AppState>) -> Result<Json<Vec<PriceListItem>>, AppError> {
    let items = SubscriptionService::new(state.backend()).price_list().await?;
    Ok(Json(items))
}

/// GET /subscriptions/me
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<SubscriptionStatus>, AppError> {
    let email = member_email(&user)?;
    let status = SubscriptionService::new(state.backend()).status(email).await?;
    Ok(Json(status))
}

/// POST /subscriptions
///
/// The start date is the gym's local date at the time of the request.
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn subscribe(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let email = member_email(&user)?;
    let today = state.hours().today(Utc::now());

    let subscription = SubscriptionService::new(state.backend())
        .subscribe(email, body.subscription_type.trim(), today)
        .await?;
    add_breadcrumb(
        "subscriptions",
        "Requested subscription",
        Some(&[("type", subscription.subscription_type.as_str())]),
    );

    Ok((StatusCode::CREATED, Json(subscription)))
}
