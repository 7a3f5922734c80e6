//! Elate Chem CLI - vendor directory tools for operators.
//!
//! # Usage
//!
//! ```bash
//! # Interactive admin listing (type to search, :n / :p to page, :q to quit)
//! ec-cli vendors search --admin
//!
//! # One-shot public search
//! ec-cli vendors search acetone
//!
//! # Next sequence number
//! ec-cli vendors next-srno
//!
//! # Add a vendor under the next sequence number
//! ec-cli vendors add --chemical-name Acetone --category Solvent --cas-number 67-64-1 \
//!     --supplier-name "Acme Chem" --contact-info sales@acme.test --phone-number 555-0100 \
//!     --business-status Manufacturer --country India
//!
//! # Change one field of vendor 12
//! ec-cli vendors update 12 --country Germany
//!
//! # Delete vendor 12 without the prompt
//! ec-cli vendors delete 12 --yes
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Supabase project URL
//! - `SUPABASE_ANON_KEY` - project anon key

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::{CliError, DetailArgs};

#[derive(Parser)]
#[command(name = "ec-cli")]
#[command(author, version, about = "Elate Chem vendor directory tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and edit the vendor directory
    Vendors {
        #[command(subcommand)]
        action: VendorAction,
    },
}

#[derive(Subcommand)]
enum VendorAction {
    /// Search vendors; interactive when no query is given
    Search {
        /// Search text (chemical name or CAS number)
        query: Option<String>,

        /// Admin listing: everything, ordered by sequence number
        #[arg(long)]
        admin: bool,

        /// Page to show for a one-shot search
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
    /// Print the sequence number the next vendor will get
    NextSrno,
    /// Add a vendor under the next sequence number
    Add {
        #[command(flatten)]
        details: DetailArgs,
    },
    /// Change fields of an existing vendor
    Update {
        /// Sequence number of the vendor
        srno: String,

        #[command(flatten)]
        details: DetailArgs,
    },
    /// Delete a vendor
    Delete {
        /// Sequence number of the vendor
        srno: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so listings on stdout stay clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "elate_chem_cli=info,elate_chem_site=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Commands::Vendors { action } = cli.command;
    let service = commands::connect()?;

    match action {
        VendorAction::Search { query, admin, page } => match query {
            Some(query) => commands::vendors::search_once(&service, admin, &query, page).await,
            None => commands::vendors::search_interactive(service, admin).await,
        },
        VendorAction::NextSrno => commands::vendors::next_srno(&service).await,
        VendorAction::Add { details } => commands::vendors::add(service, &details).await,
        VendorAction::Update { srno, details } => {
            commands::vendors::update(service, &srno, &details).await
        }
        VendorAction::Delete { srno, yes } => commands::vendors::delete(service, &srno, yes).await,
    }
}
