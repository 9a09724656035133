//! # Tally CLI
//!
//! Operator command line over the content backend.
//!
//! ## Usage
//! ```bash
//! # Sign in and print a token for later commands
//! tally login -u ada@example.com -p secret
//!
//! export TALLY_TOKEN=eyJhbGciOi...
//!
//! # Look up products (optionally within a category)
//! tally search cola --category 4
//! tally categories
//!
//! # Dashboard figures
//! tally summary
//!
//! # Ring up an invoice: two of product 7, one of product 12
//! tally sell --customer "Ada Lovelace" --email ada@example.com \
//!     --phone 555-0100 --item 7:2 --item 12
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tally_client::{ClientConfig, ClientError, ClientResult, Session};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::sales::{ItemArg, PricingMode};

#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about = "Tally point-of-sale command line")]
struct Cli {
    /// Config file (defaults to the platform config dir's tally.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token from `tally login`
    #[arg(long, global = true, env = "TALLY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the session token
    Login {
        /// Email or username
        #[arg(short = 'u', long)]
        identifier: String,

        #[arg(short, long, env = "TALLY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "TALLY_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,
    },

    /// Search products by name
    Search {
        text: String,

        /// Restrict to a category id
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List product categories
    Categories,

    /// Show the dashboard summary and the last week of daily totals
    Summary,

    /// Build and submit an invoice
    Sell {
        #[arg(long)]
        customer: String,

        /// Invoice number (generated when omitted)
        #[arg(long)]
        invoice: Option<String>,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        notes: Option<String>,

        /// Product id with optional quantity, e.g. `7:2`. Repeatable.
        #[arg(long = "item", required = true, value_parser = commands::sales::parse_item)]
        items: Vec<ItemArg>,

        /// Which discount/tax policy to apply
        #[arg(long, value_enum, default_value_t = PricingMode::Invoice)]
        pricing: PricingMode,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            if let Some(hint) = unauthorized_hint(&e) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = ClientConfig::load(cli.config)?;
    let session = cli
        .token
        .filter(|t| !t.trim().is_empty())
        .map(Session::with_token)
        .unwrap_or_else(Session::anonymous);

    match cli.command {
        Commands::Login {
            identifier,
            password,
        } => commands::auth::login(&config, identifier, password).await,
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => commands::auth::register(&config, email, password, first_name, last_name).await,
        Commands::Search { text, category } => {
            commands::catalog::search(&config, session, &text, category).await
        }
        Commands::Categories => commands::catalog::categories(&config, &session).await,
        Commands::Summary => commands::sales::summary(&config, &session).await,
        Commands::Sell {
            customer,
            invoice,
            email,
            phone,
            notes,
            items,
            pricing,
        } => {
            let order = commands::sales::Order {
                customer,
                invoice,
                email,
                phone,
                notes,
                items,
                pricing,
            };
            commands::sales::sell(&config, &session, order).await
        }
    }
}

fn unauthorized_hint(err: &ClientError) -> Option<&'static str> {
    err.is_unauthorized()
        .then_some("Run `tally login` and export TALLY_TOKEN first.")
}
