//! Rocky Gym CLI - Front desk tools.
//!
//! # Usage
//!
//! ```bash
//! # Show the locker board
//! gym-cli lockers list
//!
//! # Reserve locker #3, asking for confirmation
//! gym-cli lockers reserve 3
//!
//! # Reserve without asking
//! gym-cli lockers reserve 3 --yes
//!
//! # Browse the catalog
//! gym-cli catalog products
//! gym-cli catalog supplements
//! gym-cli catalog exercises
//!
//! # Subscription prices and opening status
//! gym-cli prices
//! gym-cli status
//! ```
//!
//! Configuration is read from the same environment variables as the
//! storefront; set `GYM_BACKEND=memory` to try the commands on demo data.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gym-cli")]
#[command(author, version, about = "Rocky Gym CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and reserve lockers
    Lockers {
        #[command(subcommand)]
        action: LockerAction,
    },
    /// Browse products, supplements and exercises
    Catalog {
        #[command(subcommand)]
        list: CatalogList,
    },
    /// Show the subscription price list
    Prices,
    /// Show whether the gym is open
    Status,
}

#[derive(Subcommand)]
enum LockerAction {
    /// List every locker
    List,
    /// Reserve a locker
    Reserve {
        /// Locker id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CatalogList {
    /// Gear sold at the front desk
    Products,
    /// Supplements with usage notes
    Supplements,
    /// Exercise names in English and Arabic
    Exercises,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let state = commands::load_state()?;

    match cli.command {
        Commands::Lockers { action } => match action {
            LockerAction::List => commands::lockers::list(&state).await?,
            LockerAction::Reserve { id, yes } => {
                commands::lockers::reserve(&state, id, yes).await?;
            }
        },
        Commands::Catalog { list } => match list {
            CatalogList::Products => commands::catalog::products(&state).await?,
            CatalogList::Supplements => commands::catalog::supplements(&state).await?,
            CatalogList::Exercises => commands::catalog::exercises(&state).await?,
        },
        Commands::Prices => commands::gym::prices(&state).await?,
        Commands::Status => commands::gym::status(&state),
    }
    Ok(())
}
