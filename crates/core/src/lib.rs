//! Rocky Gym Core - Shared types library.
//!
//! This crate provides common types used across all Rocky Gym components:
//! - `storefront` - Member-facing API over the hosted backend
//! - `cli` - Command-line client for lockers, catalog and pricing
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, statuses and
//!   subscription durations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
