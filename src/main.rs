//! Hosttech DNS record manager
//!
//! Brings DNS records hosted by Hosttech into the requested state and prints
//! the outcome as one JSON object on stdout.
//!
//! # Usage
//! ```bash
//! # Make sure www.example.ch points at 203.0.113.5
//! hosttech-dns present --zone example.ch --record www --type A --value 203.0.113.5
//!
//! # Serve new.example.ch from three addresses, replacing whatever is there
//! hosttech-dns present --zone example.ch --record new --type A --overwrite \
//!     --value 198.51.100.1 --value 198.51.100.2 --value 198.51.100.3
//!
//! # Remove a TXT value, leaving the others in place
//! hosttech-dns absent --zone example.ch --record _acme-challenge --type TXT --value token
//!
//! # Show what would change without touching the zone
//! hosttech-dns --check present --zone example.ch --record @ --type MX --value "10 mail.example.ch"
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use hosttech_dns::cli::{Cli, run};
use hosttech_dns::report::Report;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let report = match run(cli).await {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            Report::failure(&e)
        }
    };
    println!("{}", report.to_json());

    if report.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
