//! Catalog commands.

use rocky_gym_storefront::state::AppState;

use super::CommandError;

/// Print the products for sale at the front desk.
///
/// # Errors
///
/// Returns an error if the products cannot be read.
#[allow(clippy::print_stdout)]
pub async fn products(state: &AppState) -> Result<(), CommandError> {
    for product in state.catalog().list_products().await?.iter() {
        println!(
            "#{:<4} {:<24} {}",
            product.id.as_i64(),
            product.name,
            product.price().display()
        );
    }
    Ok(())
}

/// Print the supplements with their usage notes.
///
/// # Errors
///
/// Returns an error if the supplements cannot be read.
#[allow(clippy::print_stdout)]
pub async fn supplements(state: &AppState) -> Result<(), CommandError> {
    for supplement in state.catalog().list_supplements().await?.iter() {
        println!(
            "#{:<4} {:<24} {}",
            supplement.id.as_i64(),
            supplement.name,
            supplement.price().display()
        );
        if let Some(usage) = &supplement.usage {
            println!("      {usage}");
        }
    }
    Ok(())
}

/// Print the exercise list in both languages.
///
/// # Errors
///
/// Returns an error if the exercises cannot be read.
#[allow(clippy::print_stdout)]
pub async fn exercises(state: &AppState) -> Result<(), CommandError> {
    for exercise in state.catalog().list_exercises().await?.iter() {
        println!("{:<24} {}", exercise.english, exercise.arabic);
    }
    Ok(())
}
