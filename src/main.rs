use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fxr::core::log::init_logging;
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        from: String,
        to: String,
        amount: Decimal,
    },
    /// Show the latest rates for a base currency
    Latest {
        #[arg(default_value = "USD")]
        base: String,
    },
    /// Show historical rates for an inclusive date range
    History {
        base: String,
        /// Range start (YYYY-MM-DD)
        from: NaiveDate,
        /// Range end (YYYY-MM-DD)
        to: NaiveDate,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
}

impl From<Commands> for fxr::AppCommand {
    fn from(cmd: Commands) -> fxr::AppCommand {
        match cmd {
            Commands::Convert { from, to, amount } => fxr::AppCommand::Convert { from, to, amount },
            Commands::Latest { base } => fxr::AppCommand::Latest { base },
            Commands::History {
                base,
                from,
                to,
                page,
                page_size,
            } => fxr::AppCommand::History {
                base,
                from,
                to,
                page,
                page_size,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = fxr::run_command(cli.command.into(), cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
