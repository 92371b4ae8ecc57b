//! `ajok` - command-line client for the Ajok listings backend
//!
//! Usage:
//! ```bash
//! # Sign in (tokens are kept in the configured token store)
//! ajok login --email tenant@homes.test --password secret
//!
//! # Search listings
//! ajok listings --min-price 500 --bedrooms 2 --search ntinda
//!
//! # Save or unsave a listing
//! ajok favorite-toggle 12
//!
//! # Ask the agent about a listing
//! ajok inquire 12 --message "Is parking included?"
//! ```
//!
//! Results are printed to stdout as JSON.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use ajok_domain::{Config, ListingQuery, RegisterRequest};
use ajok_infra::{config, store, ApiClient, ApiError, FavoriteToggle, SessionSignal, SessionState};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "ajok", version, about = "Ajok real-estate listings client")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (TOML or JSON); probed from standard locations if omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL override
    #[arg(long, global = true, env = "AJOK_API_BASE_URL")]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the issued tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AJOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a tenant account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AJOK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat of the password; defaults to `--password`
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Forget the stored tokens
    Logout,

    /// Show the signed-in user and their landing page
    Me,

    /// List property types
    Types,

    /// Search listings
    Listings {
        /// Property type id
        #[arg(long = "type")]
        property_type: Option<i64>,
        #[arg(long)]
        min_price: Option<u64>,
        #[arg(long)]
        max_price: Option<u64>,
        /// Minimum bedrooms
        #[arg(long)]
        bedrooms: Option<u32>,
        /// Minimum bathrooms
        #[arg(long)]
        bathrooms: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        /// Sort field, e.g. `-created_at` or `price`
        #[arg(long)]
        ordering: Option<String>,
        /// Only listings created by the signed-in agent
        #[arg(long, conflicts_with_all = ["property_type", "min_price", "max_price", "bedrooms", "bathrooms", "search", "ordering"])]
        mine: bool,
    },

    /// Show one listing
    Listing { id: i64 },

    /// List saved listings
    Favorites {
        /// Show recommendations instead
        #[arg(long)]
        recommended: bool,
    },

    /// Save a listing, or unsave it if already saved
    FavoriteToggle { listing_id: i64 },

    /// List inquiries
    Inquiries,

    /// Send an inquiry about a listing
    Inquire {
        listing_id: i64,
        #[arg(long, short)]
        message: String,
    },

    /// Reply to an inquiry (agents)
    Respond {
        inquiry_id: i64,
        #[arg(long, short)]
        response: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(api) => eprintln!("error: {}", api.user_message()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::apply_env_overrides(config::load_from_file(Some(path.clone()))?)?,
        None => config::load()?,
    };
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("failed to read .env");
        }
    }

    let config = load_config(&cli).context("failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    debug!(base_url = %config.api.base_url, store = %config.session.token_store, "configuration loaded");

    let signal = Arc::new(SessionSignal::new(SessionState::Anonymous));
    let client = ApiClient::builder()
        .config(config.api.clone())
        .store(store::from_config(&config.session))
        .listener(signal.clone())
        .build()?;

    let result = dispatch(cli.command, &client).await;

    if let SessionState::SignedOut(reason) = signal.current() {
        warn!(?reason, "session ended; run `ajok login` to sign in again");
    }
    result
}

async fn dispatch(command: Command, client: &ApiClient) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = client.auth().sign_in(&email, &password).await?;
            print_json(&json!({
                "user": user,
                "role": user.role(),
                "home": user.role().home_path(),
            }))
        }
        Command::Register {
            email,
            password,
            confirm_password,
            first_name,
            last_name,
            phone,
            address,
        } => {
            let request = RegisterRequest {
                password2: confirm_password.unwrap_or_else(|| password.clone()),
                email,
                username: None,
                first_name,
                last_name,
                password,
                phone_number: phone,
                address,
            };
            let tokens = client.auth().register(&request).await?;
            print_json(&json!({ "registered": true, "detail": tokens.detail }))
        }
        Command::Logout => {
            client.auth().logout().await?;
            print_json(&json!({ "signed_out": true }))
        }
        Command::Me => {
            let user = client.auth().profile().await?;
            print_json(&json!({
                "user": user,
                "display_name": user.display_name(),
                "home": user.role().home_path(),
            }))
        }
        Command::Types => print_json(&client.listings().property_types().await?),
        Command::Listings {
            property_type,
            min_price,
            max_price,
            bedrooms,
            bathrooms,
            search,
            ordering,
            mine,
        } => {
            if mine {
                return print_json(&client.listings().my_listings().await?);
            }
            let query = ListingQuery {
                property_type,
                min_price,
                max_price,
                bedrooms,
                bathrooms,
                search: None,
                ordering,
            };
            let query = match search {
                Some(term) => query.search(term),
                None => query,
            };
            print_json(&client.listings().list(&query).await?)
        }
        Command::Listing { id } => print_json(&client.listings().get(id).await?),
        Command::Favorites { recommended: true } => {
            print_json(&client.favorites().recommended().await?)
        }
        Command::Favorites { recommended: false } => print_json(&client.favorites().list().await?),
        Command::FavoriteToggle { listing_id } => {
            match client.favorites().toggle(listing_id).await? {
                FavoriteToggle::Added(favorite) => {
                    print_json(&json!({ "saved": true, "favorite": favorite }))
                }
                FavoriteToggle::Removed { favorite_id } => {
                    print_json(&json!({ "saved": false, "removed_favorite": favorite_id }))
                }
            }
        }
        Command::Inquiries => print_json(&client.inquiries().list().await?),
        Command::Inquire { listing_id, message } => {
            print_json(&client.inquiries().create(listing_id, &message).await?)
        }
        Command::Respond { inquiry_id, response } => {
            print_json(&client.inquiries().respond(inquiry_id, &response).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
