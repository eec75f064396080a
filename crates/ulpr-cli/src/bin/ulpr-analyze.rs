use std::process::ExitCode;

use clap::Parser;
use ulpr_cli::analyze::{self, AnalyzeCli};

fn main() -> ExitCode {
    let cli = AnalyzeCli::parse();

    if let Err(e) = cli.logging.init() {
        eprintln!("warning: logging disabled: {}", e);
    }

    match analyze::run(cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
