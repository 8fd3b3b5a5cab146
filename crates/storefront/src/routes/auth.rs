//! Sign-up and sign-in route handlers.
//!
//! The backend issues the tokens; clients send the access token back as
//! `Authorization: Bearer <token>`.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, set_sentry_user};
use crate::services::AuthService;
use crate::state::AppState;
use crate::supabase::{AuthSession, AuthUser};

/// Credentials for both sign-up and sign-in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Session returned to the client after sign-in.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

impl From<AuthSession> for SessionView {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            user: session.user,
        }
    }
}

/// POST /auth/signup
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthUser>), AppError> {
    let user = AuthService::new(state.backend())
        .sign_up(&form.email, &form.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<Credentials>,
) -> Result<Json<SessionView>, AppError> {
    let session = AuthService::new(state.backend())
        .sign_in(&form.email, &form.password)
        .await?;

    set_sentry_user(
        &session.user.id,
        session.user.email.as_ref().map(|e| e.as_str()),
    );
    Ok(Json(SessionView::from(session)))
}
