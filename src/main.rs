use clap::Parser;
use std::process::ExitCode;

use adminctl::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    adminctl::logging::init();

    let cli = Cli::parse();

    match cli.command.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
