//! Core types for Rocky Gym.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod duration;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use duration::SubscriptionDuration;
pub use email::{Email, EmailError, MemberEmail, MemberEmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
