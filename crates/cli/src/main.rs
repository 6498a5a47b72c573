//! Ceramic Artistry CLI - account, cart and environment tools.
//!
//! # Usage
//!
//! ```bash
//! # Write .env.local for a local backend
//! ca-cli env local
//!
//! # Log in and fill the cart
//! ca-cli account login 9876543210
//! ca-cli cart add --id 1 --name "Speckled Mug" --price 200 --qty 2
//! ca-cli cart show
//! ```
//!
//! # Commands
//!
//! - `env` - Write an environment profile
//! - `account` - Login, signup, logout, whoami
//! - `cart` - Show and change the cart
//!
//! Local state lives in `STOREFRONT_STORAGE_DIR` (default `.storefront`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;

use ceramic_artistry_core::{NewUser, Product, ProductId};
use ceramic_artistry_storefront::config::{LOCAL_ENV_FILE, StorefrontConfig};
use ceramic_artistry_storefront::stores::Stores;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

use commands::CliError;
use commands::env::Profile;

#[derive(Parser)]
#[command(name = "ca-cli")]
#[command(author, version, about = "Ceramic Artistry storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write .env.local for a backend profile
    Env {
        #[arg(value_enum)]
        profile: Profile,
    },
    /// Manage the logged-in account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Log in with a phone number
    Login { phone_number: String },
    /// Create an account and log in
    Signup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long = "phone")]
        phone_number: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, default_value = "")]
        address: String,

        #[arg(short = 'z', long, default_value = "")]
        pincode: String,
    },
    /// Forget the logged-in account
    Logout,
    /// Show the logged-in account
    Whoami,
}

#[derive(Subcommand)]
enum CartAction {
    /// List items and totals
    Show,
    /// Add a product
    Add {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        price: Decimal,

        #[arg(long, default_value_t = 1)]
        qty: i64,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        slug: Option<String>,
    },
    /// Set a line quantity (0 removes it)
    Set {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Increase a line quantity
    Inc {
        id: i64,
        #[arg(long, default_value_t = 1)]
        by: i64,
    },
    /// Decrease a line quantity
    Dec {
        id: i64,
        #[arg(long, default_value_t = 1)]
        by: i64,
    },
    /// Remove every item
    Clear,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let command = match cli.command {
        Commands::Env { profile } => {
            return commands::env::write_profile(profile, Path::new(LOCAL_ENV_FILE));
        }
        other => other,
    };

    let config = StorefrontConfig::from_env()?;
    let stores = commands::open_stores(&config)?;

    stores.init();
    let result = dispatch(&stores, command).await;
    stores.teardown();
    result
}

async fn dispatch(stores: &Stores, command: Commands) -> Result<(), CliError> {
    let identity = stores.identity();
    let cart = stores.cart();

    match command {
        Commands::Env { .. } => {}
        Commands::Account { action } => match action {
            AccountAction::Login { phone_number } => {
                commands::account::login(identity, &phone_number).await?;
            }
            AccountAction::Signup {
                username,
                phone_number,
                email,
                address,
                pincode,
            } => {
                let form = NewUser {
                    username,
                    phone_number,
                    email,
                    address,
                    pincode,
                };
                commands::account::signup(identity, &form).await?;
            }
            AccountAction::Logout => commands::account::logout(identity),
            AccountAction::Whoami => commands::account::whoami(identity),
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(cart),
            CartAction::Add {
                id,
                name,
                price,
                qty,
                image,
                slug,
            } => {
                let product = Product {
                    id: ProductId::new(id),
                    name,
                    price,
                    image,
                    slug,
                };
                commands::cart::add(cart, product, qty).await?;
            }
            CartAction::Set { id, qty } => {
                commands::cart::set(cart, ProductId::new(id), qty).await?;
            }
            CartAction::Inc { id, by } => commands::cart::inc(cart, ProductId::new(id), by).await?,
            CartAction::Dec { id, by } => commands::cart::dec(cart, ProductId::new(id), by).await?,
            CartAction::Clear => commands::cart::clear(cart).await,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from([
            "ca-cli", "cart", "add", "--id", "1", "--name", "Mug", "--price", "199.50",
        ])
        .unwrap();
        match cli.command {
            Commands::Cart {
                action: CartAction::Add { id, price, qty, .. },
            } => {
                assert_eq!(id, 1);
                assert_eq!(price, Decimal::new(19_950, 2));
                assert_eq!(qty, 1);
            }
            _ => panic!("expected cart add"),
        }
    }

    #[test]
    fn test_parse_set_to_zero() {
        let cli = Cli::try_parse_from(["ca-cli", "cart", "set", "4", "0"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Set { id: 4, qty: 0 }
            }
        ));
    }

    #[test]
    fn test_parse_env_profile() {
        let cli = Cli::try_parse_from(["ca-cli", "env", "prod"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Env {
                    profile: Profile::Prod
                }
            })
        ));
        assert!(Cli::try_parse_from(["ca-cli", "env", "staging"]).is_err());
    }
}
