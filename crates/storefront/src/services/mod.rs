//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `lockers` - Locker board and reservations
//! - `catalog` - Products, supplements and exercises (cached)
//! - `cart` - Member carts
//! - `subscriptions` - Price list and subscription requests
//! - `auth` - Member sign-up and sign-in
//! - `profile` - Profile images
//! - `hours` - Opening hours
//!
//! Long-lived services (`LockerCoordinator`, `CatalogService`) own an
//! `Arc<dyn Backend>` and are cloned into handlers. The rest borrow the
//! backend for the length of one request.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod hours;
pub mod lockers;
pub mod profile;
pub mod subscriptions;

pub use auth::{AuthError, AuthService};
pub use cart::CartService;
pub use catalog::{CatalogError, CatalogService, Inquiry};
pub use hours::{GymHours, GymStatus, InvalidOffset};
pub use lockers::{
    LockerBoard, LockerCoordinator, LockerError, Reservation, ReservationRequest, ReserveOutcome,
};
pub use profile::{ProfileError, ProfileService};
pub use subscriptions::{SubscriptionError, SubscriptionService, SubscriptionStatus};
