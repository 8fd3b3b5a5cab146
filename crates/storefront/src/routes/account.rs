//! Account route handlers.

use axum::{Json, extract::State};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::services::ProfileService;
use crate::state::AppState;
use crate::supabase::AuthUser;

/// The signed-in member.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub user: AuthUser,
    pub profile_image: Option<String>,
}

/// Body for POST /account/image.
#[derive(Debug, Deserialize)]
pub struct ImageUpload {
    pub content_type: String,
    /// Base64 encoded image bytes.
    pub data: String,
}

/// Response for POST /account/image.
#[derive(Debug, Serialize)]
pub struct ImageView {
    pub image: String,
}

/// GET /account
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AccountView>, AppError> {
    let bucket = state.config().profile_bucket.as_str();
    let profile_image = ProfileService::new(state.backend(), bucket, user.id)
        .profile_image()
        .await?;
    Ok(Json(AccountView {
        user,
        profile_image,
    }))
}

/// POST /account/image
#[instrument(skip(state, user, upload), fields(user = %user.id, content_type = %upload.content_type))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(upload): Json<ImageUpload>,
) -> Result<Json<ImageView>, AppError> {
    let bytes = STANDARD
        .decode(upload.data.trim())
        .map_err(|e| AppError::BadRequest(format!("image data is not valid base64: {e}")))?;

    let bucket = state.config().profile_bucket.as_str();
    let image = ProfileService::new(state.backend(), bucket, user.id)
        .upload_profile_image(bytes, &upload.content_type)
        .await?;
    Ok(Json(ImageView { image }))
}
