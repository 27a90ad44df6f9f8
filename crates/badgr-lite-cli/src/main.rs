//! badgr - award Badgr badges from the command line.
//!
//! Lists badge classes and awards badges using a token file primed out of
//! band. Expired access tokens are refreshed automatically and the token
//! file is rewritten.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use badgr_lite_core::{AwardRequest, Badge, BadgrClient, BadgrError, Config};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Printed when the token pair must be primed again
const TOKEN_HINT: &str = "Prime a new token file (see the installation instructions) \
and pass it with --token-file or BADGR_TOKEN_FILE.";

#[derive(Parser)]
#[command(
    name = "badgr",
    about = "Automate Badgr tasks without the overhead of badgr-server",
    version
)]
struct Cli {
    /// File holding token credentials
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull and print the list of badge classes from the server
    List {
        /// Print the raw badge objects as JSON
        #[arg(long)]
        json: bool,
    },
    /// Award the badge with BADGE_ID to RECIPIENT
    Award {
        /// ID of the badge class to award
        #[arg(long)]
        badge_id: String,
        /// Email of the recipient
        #[arg(long)]
        recipient: String,
        /// Ask Badgr to notify the recipient
        #[arg(long)]
        notify: bool,
        /// Evidence URL for the awarded badge
        #[arg(long, requires = "evidence_narrative")]
        evidence_url: Option<String>,
        /// Evidence narrative for the awarded badge
        #[arg(long, requires = "evidence_url")]
        evidence_narrative: Option<String>,
        /// Print the raw assertion as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_badge(badge: &Badge, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(badge)?);
    } else {
        println!("{}", badge);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(token_file) = cli.token_file {
        config.token_file = Some(token_file);
    }
    let mut client = BadgrClient::from_config(&config)?;
    info!(token_file = %client.session().token_path().display(), "Using token file");

    match cli.command {
        Commands::List { json } => {
            for badge in client.list_badge_classes().await? {
                print_badge(&badge, json)?;
            }
        }
        Commands::Award {
            badge_id,
            recipient,
            notify,
            evidence_url,
            evidence_narrative,
            json,
        } => {
            let mut request = AwardRequest::new(recipient).notify(notify);
            if let (Some(url), Some(narrative)) = (evidence_url, evidence_narrative) {
                request = request.with_evidence(url, narrative);
            }
            let badge = client.award(&badge_id, &request).await?;
            print_badge(&badge, json)?;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();
    info!("badgr starting");

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        if let Some(badgr_err) = err.downcast_ref::<BadgrError>() {
            if badgr_err.needs_new_token() {
                eprintln!("{}", TOKEN_HINT);
            }
        }
        std::process::exit(1);
    }
    Ok(())
}
