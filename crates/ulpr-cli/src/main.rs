use std::process::ExitCode;

use clap::Parser;
use ulpr_cli::evaluate::{self, EvaluateCli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = EvaluateCli::parse();

    if let Err(e) = cli.logging.init() {
        eprintln!("warning: logging disabled: {}", e);
    }

    match evaluate::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
