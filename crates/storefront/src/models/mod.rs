//! Row types for the backend tables.
//!
//! Each type implements [`Record`](crate::supabase::Record) with the name of
//! the table it lives in, so services read and write it through
//! [`Table`](crate::supabase::Table).

pub mod cart;
pub mod catalog;
pub mod locker;
pub mod profile;
pub mod subscription;

pub use cart::{Cart, CartItem, CartLine, NewCartItem};
pub use catalog::{Exercise, Product, Supplement};
pub use locker::Locker;
pub use profile::{NewProfileImage, ProfileImage};
pub use subscription::{NewSubscription, PriceListItem, Subscription};
