//! Email address types.
//!
//! [`Email`] is any structurally valid address; [`MemberEmail`] is the
//! phone-number address members sign up with.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// An email address as returned by the auth service.
///
/// Only structural checks are applied here; the stricter sign-up rule lives
/// in [`MemberEmail`].
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Must contain exactly one @ symbol
/// - Local part (before @) must not be empty
/// - Domain part (after @) must not be empty
///
/// ## Examples
///
/// ```
/// use rocky_gym_core::Email;
///
/// // Valid emails
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
///
/// // Invalid emails
/// assert!(Email::parse("").is_err());           // empty
/// assert!(Email::parse("no-at-symbol").is_err()); // missing @
/// assert!(Email::parse("@domain.com").is_err());  // empty local part
/// assert!(Email::parse("user@").is_err());        // empty domain
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 254 characters
    /// - Does not contain an @ symbol
    /// - Has an empty local part or domain
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the local part of the email (before the @).
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when validating a [`MemberEmail`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemberEmailError {
    /// The address must contain exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MalformedAddress,
    /// The local part must be the member's 11-digit phone number.
    #[error("email must start with an 11 character phone number (got {got} characters)")]
    LocalPartLength {
        /// Length of the supplied local part.
        got: usize,
    },
    /// The domain must belong to the gym.
    #[error("email domain must start with {}", MemberEmail::DOMAIN_PREFIX)]
    ForeignDomain,
    /// The address failed basic email validation.
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// A gym member's sign-up address.
///
/// Members register with their phone number followed by the gym domain,
/// e.g. `01012345678@rockygym.com`.
///
/// ## Constraints
///
/// - Exactly one @ symbol
/// - Local part is exactly 11 characters
/// - Domain starts with `rockygym` (case-insensitive)
///
/// ## Examples
///
/// ```
/// use rocky_gym_core::MemberEmail;
///
/// assert!(MemberEmail::parse("01012345678@rockygym.com").is_ok());
/// assert!(MemberEmail::parse("01012345678@RockyGym.net").is_ok());
///
/// assert!(MemberEmail::parse("0101234567@rockygym.com").is_err()); // 10 chars
/// assert!(MemberEmail::parse("01012345678@gmail.com").is_err());   // foreign domain
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MemberEmail(Email);

impl MemberEmail {
    /// Required length of the local part.
    pub const LOCAL_PART_LENGTH: usize = 11;
    /// Required prefix of the domain.
    pub const DOMAIN_PREFIX: &'static str = "rockygym";

    /// Validate a sign-up address against the member rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not `<11 chars>@rockygym...`.
    pub fn parse(s: &str) -> Result<Self, MemberEmailError> {
        let mut parts = s.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(MemberEmailError::MalformedAddress);
        };

        let got = local.chars().count();
        if got != Self::LOCAL_PART_LENGTH {
            return Err(MemberEmailError::LocalPartLength { got });
        }

        if !domain.to_lowercase().starts_with(Self::DOMAIN_PREFIX) {
            return Err(MemberEmailError::ForeignDomain);
        }

        Ok(Self(Email::parse(s)?))
    }

    /// The underlying email address.
    #[must_use]
    pub const fn as_email(&self) -> &Email {
        &self.0
    }

    /// Consumes the wrapper and returns the email address.
    #[must_use]
    pub fn into_email(self) -> Email {
        self.0
    }

    /// The member's phone number (the local part).
    #[must_use]
    pub fn phone(&self) -> &str {
        self.0.local_part()
    }
}

impl fmt::Display for MemberEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
