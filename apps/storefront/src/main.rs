//! # `storefront` Command Line
//!
//! Runs the storefront commands against local JSON files: the same code
//! path the mobile app uses, without the app.
//!
//! ## Usage
//! ```text
//! storefront search --catalog listings.json -p q=shirt -p categories=Tops --sort price-asc
//! storefront price  --cart cart.json --promo WELCOME10 [--checkout]
//! storefront options
//! storefront config
//! ```
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr.
//! Pricing follows the `TOPCARE_*` environment variables.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use topcare_core::filter::SortOrder;
use topcare_core::pricing::PromoOutcome;
use topcare_storefront::commands::cart::{self, CartResponse, CheckoutResponse};
use topcare_storefront::commands::{config as config_commands, search};
use topcare_storefront::{init_tracing, CartState, CatalogState, ConfigState};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Search TopCare listings and price carts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a listings export
    Search {
        /// Listings JSON: an array, or {"listings": [...]}
        #[arg(short, long)]
        catalog: PathBuf,

        /// Filter parameter as key=value, e.g. categories=Tops,Dresses. Repeatable.
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Result order: newest, price-asc, price-desc, name
        #[arg(short, long, default_value = "newest")]
        sort: SortOrder,
    },

    /// Price a cart built from cart-provider payloads
    Price {
        /// Cart JSON: an array of payloads, or {"items": [...]}
        #[arg(short, long)]
        cart: PathBuf,

        /// Promo code to enter
        #[arg(long)]
        promo: Option<String>,

        /// Check out after pricing
        #[arg(long)]
        checkout: bool,
    },

    /// Show the filter panel options
    Options,

    /// Show the active configuration
    Config,
}

/// Output of the `price` subcommand.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceReport {
    cart: CartResponse,
    promo: Option<PromoOutcome>,
    checkout: Option<CheckoutResponse>,
    skipped_payloads: usize,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_payloads(path: &Path) -> Result<Vec<Value>, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Array(payloads) => Ok(payloads),
        Value::Object(mut body) => match body.remove("items") {
            Some(Value::Array(payloads)) => Ok(payloads),
            _ => Err("expected an array of cart items or {\"items\": [...]}".into()),
        },
        _ => Err("expected an array of cart items or {\"items\": [...]}".into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = ConfigState::from_env()?;
    info!(store = %config.store_name, "Storefront starting");

    match cli.command {
        Commands::Search {
            catalog,
            params,
            sort,
        } => {
            let catalog_state = CatalogState::default();
            let json = fs::read_to_string(&catalog)?;
            let load = search::load_catalog(&catalog_state, &json)?;
            for rejected in &load.rejected {
                warn!(index = rejected.index, id = ?rejected.id, reason = %rejected.reason, "Listing skipped");
            }

            let response = search::search_catalog(&catalog_state, &params, sort);
            info!(matched = response.total, "Search complete");
            print_json(&response)?;
        }

        Commands::Price {
            cart: cart_file,
            promo,
            checkout,
        } => {
            let cart_state = CartState::new();
            let mut skipped_payloads = 0;

            for payload in read_payloads(&cart_file)? {
                if let Err(err) = cart::add_to_cart(&cart_state, &config, &payload) {
                    warn!(error = %err, "Cart payload skipped");
                    skipped_payloads += 1;
                }
            }

            let promo = promo.map(|code| cart::apply_promo(&cart_state, &config, &code).outcome);
            let priced = cart::get_cart(&cart_state, &config);
            let checkout = if checkout {
                Some(cart::checkout(&cart_state, &config)?)
            } else {
                None
            };

            print_json(&PriceReport {
                cart: priced,
                promo,
                checkout,
                skipped_payloads,
            })?;
        }

        Commands::Options => print_json(&search::get_filter_options())?,

        Commands::Config => print_json(&config_commands::get_config(&config))?,
    }

    Ok(())
}
