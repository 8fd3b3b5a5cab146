//! Gym-wide commands: opening status and the price list.

use chrono::Utc;

use rocky_gym_storefront::services::SubscriptionService;
use rocky_gym_storefront::state::AppState;

use super::CommandError;

/// Print whether the gym is open right now.
#[allow(clippy::print_stdout)]
pub fn status(state: &AppState) {
    let status = state.hours().status(Utc::now());
    println!("{}", status.headline);
    println!("{}", status.detail);
}

/// Print the subscription price list.
///
/// # Errors
///
/// Returns an error if the price list cannot be read.
#[allow(clippy::print_stdout)]
pub async fn prices(state: &AppState) -> Result<(), CommandError> {
    let items = SubscriptionService::new(state.backend()).price_list().await?;
    for item in items {
        println!(
            "{:<16} {:<10} {}",
            item.title,
            item.duration,
            item.price().display()
        );
    }
    Ok(())
}
