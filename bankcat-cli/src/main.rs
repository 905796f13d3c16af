//! bankcat CLI - categorize bank statement exports

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::categorize::CategorizeArgs;
use commands::{categorize, config, get_logger, ingest, log_event, logs, profiles};
use bankcat_core::LogEvent;

/// bankcat - categorize bank statement exports
#[derive(Parser)]
#[command(name = "bankcat", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported banks and file types
    Profiles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read a statement and show the parsed transactions
    Ingest {
        /// Path to the statement file
        file: PathBuf,
        /// Bank the statement came from
        #[arg(long)]
        bank: Option<String>,
        /// Statement file type (e.g. text/csv)
        #[arg(long)]
        file_type: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Categorize a statement and write the categorized CSV
    Categorize {
        /// Path to the statement file
        file: PathBuf,
        /// Bank the statement came from
        #[arg(long)]
        bank: Option<String>,
        /// Statement file type (e.g. text/csv)
        #[arg(long)]
        file_type: Option<String>,
        /// Override a category after categorization (ROW=CATEGORY, rows start at 1)
        #[arg(long = "set", value_name = "ROW=CATEGORY")]
        overrides: Vec<String>,
        /// Output path (defaults to categorized_transactions.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Leave the category cell empty for uncategorized rows
        #[arg(long)]
        blank_uncategorized: bool,
        /// Quote fields that contain commas, quotes or newlines
        #[arg(long)]
        quote: bool,
        /// Reject categorizer responses that do not line up with the input
        #[arg(long)]
        verify: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Profiles { .. } => "profiles",
            Commands::Ingest { .. } => "ingest",
            Commands::Categorize { .. } => "categorize",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();
    log_event(
        &get_logger(),
        LogEvent::new("command_executed").with_command(command),
    );

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let event = e
                .downcast_ref::<bankcat_core::Error>()
                .map(|err| err.kind())
                .unwrap_or("command_failed");
            log_event(
                &get_logger(),
                LogEvent::new(event)
                    .with_command(command)
                    .with_error(format!("{:#}", e)),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Profiles { json } => profiles::run(json),
        Commands::Ingest { file, bank, file_type, json } => ingest::run(file, bank, file_type, json),
        Commands::Categorize {
            file,
            bank,
            file_type,
            overrides,
            output,
            blank_uncategorized,
            quote,
            verify,
            json,
        } => categorize::run(CategorizeArgs {
            file,
            bank,
            file_type,
            overrides,
            output,
            blank_uncategorized,
            quote,
            verify,
            json,
        }),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
