//! Rocky Gym Storefront library.
//!
//! This crate provides the member-facing API as a library, allowing it to
//! be tested against the in-memory backend and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;
