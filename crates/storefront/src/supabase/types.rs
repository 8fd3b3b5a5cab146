//! Auth types returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rocky_gym_core::{Email, UserId};

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Account id issued by the auth service.
    pub id: UserId,
    /// Email, absent for phone-only accounts.
    #[serde(default)]
    pub email: Option<Email>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A signed-in session.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token for obtaining a new access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// The signed-in account.
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_user_from_gotrue_json() {
        let json = r#"{
            "id": "5f0c8a64-2a4a-4d3e-9d55-1a8f2c8b9f10",
            "aud": "authenticated",
            "email": "01012345678@rockygym.com",
            "created_at": "2026-01-05T10:00:00.000000Z"
        }"#;
        let user: AuthUser = serde_json::from_str(json).unwrap();
        assert_eq!(
            user.email.as_ref().map(Email::as_str),
            Some("01012345678@rockygym.com")
        );
    }

    #[test]
    fn test_session_debug_redacts_tokens() {
        let session = AuthSession {
            access_token: "very-secret-access".to_string(),
            refresh_token: Some("very-secret-refresh".to_string()),
            expires_in: Some(3600),
            user: AuthUser {
                id: UserId::new(uuid::Uuid::new_v4()),
                email: None,
                created_at: Utc::now(),
            },
        };
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret-access"));
        assert!(!debug.contains("very-secret-refresh"));
    }
}
