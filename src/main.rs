// src/main.rs

use std::process::ExitCode;

use watchtask::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("watchtask error: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_intentional() => {
            tracing::info!(reason = %err, "stopped intentionally");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("watchtask error: {err}");
            ExitCode::FAILURE
        }
    }
}
