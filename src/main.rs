use clap::Parser;
use std::process::ExitCode;

use text_companion::cli::{self, Cli};
use text_companion::logging::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
