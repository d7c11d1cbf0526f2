//! Orcalens - diagnostics and reporting for Web ORCA clinical databases.
//!
//! Every run is a single linear pass: parse the command, load configuration,
//! run one report or diagnostic routine against the database, print, exit.
//! Report routines handle their own database errors; only failures outside
//! any routine's handling reach the top level (exit code 1). A user
//! interrupt exits 0.

mod cli;
mod config;
mod constants;
mod db;
mod diagnose;
mod format;
mod reports;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = cli::args::Args::parse();
    let config = config::load();

    tokio::select! {
        result = cli::commands::run(args.command, &config) => result,
        () = interrupted() => {
            println!("\nInterrupted by user.");
            Ok(())
        }
    }
}

async fn interrupted() {
    // If signal registration fails there is nothing to wait on; park the
    // branch forever and let the command run.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
