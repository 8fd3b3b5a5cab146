//! HTTP route handlers for the storefront.
//!
//! Every endpoint speaks JSON. Errors come back as `{ "error": "..." }`
//! with the status chosen by [`AppError`](crate::error::AppError).
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (backend reachable)
//! GET    /status                      - Open/closed status
//!
//! # Lockers
//! GET    /lockers                     - Locker board
//! GET    /lockers/{id}/reservation    - Confirmation prompt for a locker
//! POST   /lockers/{id}/reserve        - Confirm a reservation
//!
//! # Catalog
//! GET    /products                    - Product listing
//! GET    /products/{id}/inquiry       - Contact link for a product
//! GET    /supplements                 - Supplement listing
//! GET    /supplements/{id}/inquiry    - Contact link for a supplement
//! GET    /exercises                   - Exercise list
//!
//! # Subscriptions
//! GET    /subscriptions/prices        - Price list
//! GET    /subscriptions/me            - Member's subscription (requires auth)
//! POST   /subscriptions               - Request a subscription (requires auth)
//!
//! # Cart (requires auth)
//! GET    /cart                        - Cart with totals
//! POST   /cart                        - Add a product
//! POST   /cart/{id}                   - Change a line's quantity
//! DELETE /cart/{id}                   - Remove a line
//!
//! # Auth
//! POST   /auth/signup                 - Create an account
//! POST   /auth/login                  - Sign in
//!
//! # Account (requires auth)
//! GET    /account                     - Member and profile image
//! POST   /account/image               - Replace the profile image
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod lockers;
pub mod status;
pub mod subscriptions;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::services::profile::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Base64 inflates by a third; leave room for the JSON around it.
const IMAGE_BODY_LIMIT: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

/// Create the locker routes router.
pub fn locker_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(lockers::index))
        .route("/{id}/reservation", get(lockers::reservation))
        .route("/{id}/reserve", post(lockers::reserve))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::products))
        .route("/{id}/inquiry", get(catalog::product_inquiry))
}

/// Create the supplement routes router.
pub fn supplement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::supplements))
        .route("/{id}/inquiry", get(catalog::supplement_inquiry))
}

/// Create the subscription routes router.
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(subscriptions::subscribe))
        .route("/prices", get(subscriptions::prices))
        .route("/me", get(subscriptions::me))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/{id}", post(cart::update).delete(cart::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route(
            "/image",
            post(account::upload_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::show))
        .nest("/lockers", locker_routes())
        .nest("/products", product_routes())
        .nest("/supplements", supplement_routes())
        .route("/exercises", get(catalog::exercises))
        .nest("/subscriptions", subscription_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
}

/// The complete application: routes, health checks and request middleware.
///
/// Sentry layers are added by the binary so tests can build the app
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .merge(routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
