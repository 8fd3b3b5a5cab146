//! Authentication service.
//!
//! Accounts live in the backend's auth service. Members sign up with their
//! phone number as the local part of a gym address
//! (`01012345678@rockygym.com`), which is checked here before anything is
//! sent to the backend.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use rocky_gym_core::MemberEmail;

use crate::supabase::{AuthSession, AuthUser, Backend, BackendError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a dyn Backend,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Register a new member.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email breaks the member rule.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUser, AuthError> {
        let email = MemberEmail::parse(email.trim())?;
        validate_password(password)?;

        let user = self
            .backend
            .sign_up(email.as_email().as_str(), password)
            .await
            .map_err(|e| match e {
                BackendError::Rejected { status: 422, .. } => AuthError::UserAlreadyExists,
                other => AuthError::Backend(other),
            })?;

        info!(user_id = %user.id, "Member signed up");
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        self.backend
            .sign_in(email.trim(), password)
            .await
            .map_err(|e| match e {
                BackendError::Rejected { status: 400, .. } | BackendError::Unauthorized(_) => {
                    AuthError::InvalidCredentials
                }
                other => AuthError::Backend(other),
            })
    }

    /// Resolve the member behind an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is not accepted.
    pub async fn current_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.backend
            .user_for_token(access_token)
            .await
            .map_err(|e| match e {
                BackendError::Unauthorized(_) | BackendError::Rejected { status: 400..=499, .. } => {
                    AuthError::InvalidToken
                }
                other => AuthError::Backend(other),
            })
    }
}

/// Validate password meets requirements.
fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocky_gym_core::MemberEmailError;

    use super::*;
    use crate::supabase::InMemoryBackend;

    const EMAIL: &str = "01012345678@rockygym.com";

    fn password(p: &str) -> SecretString {
        SecretString::from(p.to_string())
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let backend = InMemoryBackend::new();
        let auth = AuthService::new(&backend);

        let user = auth.sign_up(EMAIL, &password("s3cret!")).await.unwrap();
        let session = auth.sign_in(EMAIL, &password("s3cret!")).await.unwrap();
        assert_eq!(session.user.id, user.id);

        let current = auth.current_user(&session.access_token).await.unwrap();
        assert_eq!(current.email, user.email);
    }

    #[tokio::test]
    async fn test_member_rule_checked_before_backend() {
        let backend = InMemoryBackend::new();
        backend.set_unavailable(true).await;
        let auth = AuthService::new(&backend);

        let err = auth
            .sign_up("0101234567@rockygym.com", &password("s3cret!"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidEmail(MemberEmailError::LocalPartLength { got: 10 })
        ));

        let err = auth
            .sign_up("01012345678@gmail.com", &password("s3cret!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(MemberEmailError::ForeignDomain)));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_short_password() {
        let backend = InMemoryBackend::new();
        let err = AuthService::new(&backend)
            .sign_up(EMAIL, &password("12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_duplicate_and_wrong_password() {
        let backend = InMemoryBackend::new();
        let auth = AuthService::new(&backend);
        auth.sign_up(EMAIL, &password("s3cret!")).await.unwrap();

        assert!(matches!(
            auth.sign_up(EMAIL, &password("another1")).await,
            Err(AuthError::UserAlreadyExists)
        ));
        assert!(matches!(
            auth.sign_in(EMAIL, &password("wrong-one")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.current_user("not-a-token").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
