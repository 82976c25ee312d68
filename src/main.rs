mod classifier;
mod commands;
mod config;
mod corpus;
mod diagnostics;
mod error;
mod locator;
mod oracle;
mod patterns;
mod perf;
mod preview;
mod provider;
mod search;
mod tokenizer;
mod types;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::types::SymbolKind;

/// Exit code for errors that stopped the command.
const EXIT_ERROR: u8 = 2;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "NGPEEK_LOG";

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "ngpeek", version, about = "Peek at AngularJS directive and controller definitions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log lookup decisions and timings to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show the definition of the directive or controller at a position
    Peek {
        /// Markup document (.html, .htm, .xhtml, .ng)
        document: String,
        /// Cursor position as LINE:COLUMN, both starting at 1
        at: String,
        /// Selection end as LINE:COLUMN; defaults to the cursor
        #[arg(long)]
        end: Option<String>,
        /// Emit JSON instead of a text preview
        #[arg(long)]
        json: bool,
    },
    /// Scan the whole project for a directive or controller registration
    Find {
        /// What kind of registration to look for
        #[arg(value_enum)]
        kind: SymbolKind,
        /// Name as written in markup or in code (`my-widget` or `myWidget`)
        name: String,
        /// Emit JSON instead of a text preview
        #[arg(long)]
        json: bool,
    },
    /// Show how the token at a position is classified and normalized
    Classify {
        /// Markup document
        document: String,
        /// Position as LINE:COLUMN, both starting at 1
        at: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Peek { document, at, end, json } => {
            commands::peek(&document, &at, end.as_deref(), json).await
        },
        Commands::Find { kind, name, json } => commands::find(kind, &name, json).await,
        Commands::Classify { document, at } => commands::classify(&document, &at),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(EXIT_ERROR)
        },
    };
}

/// Log to stderr, filtered by `NGPEEK_LOG`. Without it, only warnings are
/// shown, or debug events with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_err| return EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
