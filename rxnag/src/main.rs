// RxNag - medication reminder
// Entry point and runtime setup

use clap::Parser;
use rxnag::cli::Args;
use rxnag::error::AppError;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Logs go to stderr; stdout belongs to the console view
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rxnag=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    tracing::info!("Starting RxNag {}", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("rxnag: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(rxnag::app::run(args));

    // A console read may still be blocked on stdin; don't wait for it
    runtime.shutdown_timeout(Duration::from_millis(100));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(AppError::AlreadyRunning(_)) = e.downcast_ref::<AppError>() {
                eprintln!("rxnag: {}", e);
                eprintln!("rxnag: use the running instance, or quit it first");
            } else {
                tracing::error!("{:#}", e);
                eprintln!("rxnag: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
