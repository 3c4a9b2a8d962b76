mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::Level;

use commands::amortize::AmortizeArgs;
use commands::loans::JsonInputArgs;

/// Loan amortization schedules and draw tracking
#[derive(Parser)]
#[command(
    name = "loanl",
    version,
    about = "Loan amortization schedules and draw tracking",
    long_about = "A CLI for real-estate development loans with decimal precision. \
                  Builds amortization schedules with interest-only periods, replays \
                  draw and payment lifecycles, and aggregates portfolio utilization."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a month-by-month amortization schedule
    Amortize(AmortizeArgs),
    /// Funding, fee and rate summary for one loan
    LoanSummary(JsonInputArgs),
    /// Replay draw and payment actions against a loan account
    Draws(JsonInputArgs),
    /// Utilization and weighted average rate across loans
    Portfolio(JsonInputArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::amortize::run_amortize(args),
        Commands::LoanSummary(args) => commands::loans::run_loan_summary(args),
        Commands::Draws(args) => commands::loans::run_draws(args),
        Commands::Portfolio(args) => commands::loans::run_portfolio(args),
        Commands::Version => {
            println!("loanl {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
