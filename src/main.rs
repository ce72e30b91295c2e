use adoptmap::cli::{Cli, Commands};
use adoptmap::commands::analyze::{handle_analyze, AnalyzeConfig};
use adoptmap::observability::{init_logging, install_panic_hook};
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

/// Recoverable outcomes (unknown customer, nothing to analyze).
const EXIT_NO_DATA: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    install_panic_hook();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Analyze {
            customer_id,
            data,
            config,
            format,
            trend_file,
            as_of,
        } => handle_analyze(AnalyzeConfig {
            customer_id,
            data,
            config,
            format: format.into(),
            trend_file,
            as_of,
        }),
        Commands::List { data } => adoptmap::commands::list::list_customers(data.as_deref()),
        Commands::Init { force } => adoptmap::commands::init::init_config(force),
    }
}

// Side effect: print a user-facing message and pick the exit code
fn report_error(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<adoptmap::Error>() {
        Some(domain) if domain.is_recoverable() => {
            eprintln!("{} [{}] {}", "No data:".yellow().bold(), domain.code(), domain);
            ExitCode::from(EXIT_NO_DATA)
        }
        Some(domain) => {
            eprintln!("{} [{}] {}", "Error:".red().bold(), domain.code(), domain);
            ExitCode::FAILURE
        }
        None => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
