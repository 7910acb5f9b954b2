//! WAN Monitor - Main CLI Application
//!
//! Runs one measurement-and-report pass by default, or manages the pinned
//! server and schedule through subcommands.

use clap::Parser;
use std::{error::Error, process};
use wan_monitor::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter, Result},
    PKG_NAME, VERSION,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the command that was running.");
        process::exit(1);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    let verbose = cli.verbose || cli.debug;
    let use_color = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        ErrorReporter::new(use_color, verbose).report_error(&e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        if !verbose {
            print_error_suggestions(&e);
        }

        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        println!("{} v{}", PKG_NAME, VERSION);
        println!(
            "Built {} from {}",
            env!("WANMON_BUILD_TIME"),
            env!("WANMON_GIT_COMMIT")
        );
        println!("Debug mode enabled");
        println!();
    }

    App::new(cli)?.run().await
}

/// Print short hints for the errors an operator can act on
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format ('wanmon env' lists the variables)");
            eprintln!("  - Verify the directory URL starts with http:// or https://");
            eprintln!("  - A corrupt config.json can be reset with 'wanmon unpin'");
        }
        AppError::DirectoryUnavailable(_) | AppError::DirectoryResponseMalformed(_) => {
            eprintln!();
            eprintln!("Directory lookup help:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Retry the search; lookups are never retried automatically");
        }
        AppError::NoServerAvailable(_) | AppError::Backend(_) => {
            eprintln!();
            eprintln!("Measurement client help:");
            eprintln!("  - Make sure speedtest-cli is installed or pass --backend");
            eprintln!("  - Pin a known-good server with 'wanmon pin <term> --pick N'");
        }
        AppError::Measurement { .. } => {
            eprintln!();
            eprintln!("No report was written for this run. The next scheduled run will try again.");
        }
        AppError::AlreadyRunning(_) => {
            eprintln!();
            eprintln!("A previous run is still in progress. Consider a longer schedule interval.");
        }
        _ => {}
    }
}
