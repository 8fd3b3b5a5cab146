//! Authentication error types.

use thiserror::Error;

use rocky_gym_core::MemberEmailError;

use crate::supabase::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Sign-up email does not follow the member rule.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] MemberEmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Access token missing, expired or revoked.
    #[error("invalid or expired session")]
    InvalidToken,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Backend error.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AuthError {
    /// Whether the caller supplied bad input, as opposed to a failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidEmail(_) | Self::WeakPassword(_))
    }
}
