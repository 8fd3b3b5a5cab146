//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Errors are sent as JSON: `{ "error": "message" }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{
    AuthError, CatalogError, LockerError, ProfileError, SubscriptionError,
};
use crate::supabase::BackendError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Locker operation failed.
    #[error("Locker error: {0}")]
    Locker(#[from] LockerError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Subscription operation failed.
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// Profile operation failed.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err) => backend_status(err),
            Self::Locker(err) => match err {
                LockerError::AwaitingStaff { .. } | LockerError::JustTaken { .. } => {
                    StatusCode::CONFLICT
                }
                LockerError::NotFound(_) => StatusCode::NOT_FOUND,
                LockerError::Backend(e) => backend_status(e),
            },
            Self::Catalog(err) => match err {
                CatalogError::ProductNotFound(_) | CatalogError::SupplementNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CatalogError::Backend(e) => backend_status(e),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Backend(e) => backend_status(e),
            },
            Self::Subscription(err) => match err {
                SubscriptionError::AlreadySubscribed => StatusCode::CONFLICT,
                SubscriptionError::UnknownType(_) => StatusCode::BAD_REQUEST,
                SubscriptionError::Backend(e) => backend_status(e),
            },
            Self::Profile(err) => match err {
                ProfileError::Empty | ProfileError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
                ProfileError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                ProfileError::Backend(e) => backend_status(e),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Backend(BackendError::RateLimited(_)) => {
                "Too many requests, please try again shortly".to_string()
            }
            _ if self.status().is_server_error() => "External service error".to_string(),
            Self::Locker(err) => err.to_string(),
            Self::Catalog(err) => err.to_string(),
            Self::Subscription(err) => err.to_string(),
            Self::Profile(err) => err.to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::InvalidToken => "Session expired, please sign in again".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(e) => format!("Invalid email address: {e}"),
                AuthError::Backend(_) => "Authentication error".to_string(),
            },
            Self::Backend(_) => "External service error".to_string(),
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("lockers", "Confirmed reservation", Some(&[("locker_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use rocky_gym_core::{LockerId, MemberEmailError};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("locker 9".to_string());
        assert_eq!(err.to_string(), "Not found: locker 9");

        let err = AppError::BadRequest("invalid base64".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid base64");
    }

    #[test]
    fn test_precondition_errors_are_conflicts() {
        assert_eq!(
            get_status(LockerError::AwaitingStaff { number: "B1".into() }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(LockerError::JustTaken { number: "B1".into() }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(SubscriptionError::AlreadySubscribed.into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_and_lookup_statuses() {
        assert_eq!(
            get_status(AuthError::InvalidEmail(MemberEmailError::ForeignDomain).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(SubscriptionError::UnknownType("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(LockerError::NotFound(LockerId::new(9)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AuthError::InvalidToken.into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_backend_failures() {
        let rejected = || BackendError::Rejected {
            status: 500,
            message: "relation \"lockers\" does not exist".into(),
        };
        assert_eq!(get_status(rejected().into()), StatusCode::BAD_GATEWAY);
        assert_eq!(
            get_status(LockerError::Backend(rejected()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(BackendError::RateLimited(3).into()),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn test_body_hides_backend_details() {
        let err: AppError = BackendError::Rejected {
            status: 500,
            message: "relation \"lockers\" does not exist".into(),
        }
        .into();
        let body = to_bytes(err.into_response().into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "External service error");
    }

    #[tokio::test]
    async fn test_body_carries_precondition_message() {
        let err: AppError = LockerError::AwaitingStaff { number: "B1".into() }.into();
        let body = to_bytes(err.into_response().into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("contact the gym staff"));
    }
}
