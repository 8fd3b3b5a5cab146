//! Locker commands.

use std::io::{self, BufRead, Write};

use rocky_gym_core::LockerId;
use rocky_gym_storefront::services::{LockerBoard, ReserveOutcome};
use rocky_gym_storefront::state::AppState;

use super::CommandError;

/// Print every locker, available ones first.
///
/// # Errors
///
/// Returns an error if the lockers cannot be read.
pub async fn list(state: &AppState) -> Result<(), CommandError> {
    let board = state.lockers().list_lockers().await?;
    print_board(&board);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_board(board: &LockerBoard) {
    println!("Available ({})", board.available().len());
    for locker in board.available() {
        println!("  #{:<4} {}", locker.id.as_i64(), locker.number);
    }
    println!("Taken ({})", board.taken().len());
    for locker in board.taken() {
        println!("  #{:<4} {:<6} {}", locker.id.as_i64(), locker.number, locker.status);
    }
}

/// Reserve a locker, asking for confirmation unless `yes` is set.
///
/// # Errors
///
/// Returns an error if the locker is unknown, waiting on staff, was taken
/// in the meantime, or the backend fails.
#[allow(clippy::print_stdout)]
pub async fn reserve(state: &AppState, id: i64, yes: bool) -> Result<(), CommandError> {
    let locker = state.lockers().get_locker(LockerId::new(id)).await?;

    let mut prompt_error = None;
    let outcome = state
        .lockers()
        .reserve(&locker, |request| {
            if yes {
                return true;
            }
            match ask(&request.prompt()) {
                Ok(answer) => answer,
                Err(e) => {
                    prompt_error = Some(e);
                    false
                }
            }
        })
        .await?;
    if let Some(e) = prompt_error {
        return Err(e.into());
    }

    match outcome {
        ReserveOutcome::Ignored => {
            println!("Locker {} is not available.", locker.number);
        }
        ReserveOutcome::Cancelled => {
            println!("Cancelled.");
        }
        ReserveOutcome::Reserved(reservation) => {
            tracing::info!(
                locker_id = %reservation.locker.id,
                "Locker reserved, awaiting staff confirmation"
            );
            println!(
                "Locker {} reserved. Staff will confirm it shortly.",
                reservation.locker.number
            );
            print_board(&reservation.board);
        }
    }
    Ok(())
}

/// Ask a yes/no question on the terminal.
#[allow(clippy::print_stdout)]
fn ask(question: &str) -> io::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "نعم"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(is_yes("نعم"));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }
}
