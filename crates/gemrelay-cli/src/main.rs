//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use gemrelay_cli::{Cli, init_tracing, run};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before parsing so .env can supply flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
