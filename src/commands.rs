//! CLI commands for ngpeek: peek, find, classify.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::debug;

use crate::classifier;
use crate::config::Config;
use crate::corpus::ProjectCorpus;
use crate::error::Error;
use crate::locator::{FileFilter, Locator, aggregate};
use crate::oracle::CommandOracle;
use crate::preview;
use crate::provider;
use crate::tokenizer::{MarkupDocument, TokenSource};
use crate::types::{DocumentMode, LocatorResult, Position, Selection, SymbolKind};

/// Exit code when nothing was found or nothing was referenced.
const EXIT_NOT_FOUND: u8 = 1;

/// Locate the definition of the directive or controller under the cursor.
///
/// `at` and `end` are 1-based `LINE:COLUMN` positions; `end` defaults to `at`.
///
/// # Errors
///
/// Returns `Error::InvalidPosition` for malformed positions, `Error::FileNotFound`
/// if the document is missing, and config errors from `.ngpeek.toml`.
pub async fn peek(document: &str, at: &str, end: Option<&str>, json: bool) -> Result<ExitCode, Error> {
    let start = parse_position(at)?;
    let selection = match end {
        Some(end) => Selection {
            end: parse_position(end)?,
            start,
        },
        None => Selection::caret(start),
    };

    let root = PathBuf::from(".");
    let locator = build_locator(&root)?;
    let doc = MarkupDocument::open(Path::new(document))?;

    let Some(result) = provider::provide(&doc, selection, &locator).await else {
        eprintln!("No directive or controller reference at {document}:{at}");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
    };
    return print_result(&result, json);
}

/// Scan the whole project for registrations of `name`, without the oracle.
///
/// # Errors
///
/// Returns config errors and corpus enumeration failures.
pub async fn find(kind: SymbolKind, name: &str, json: bool) -> Result<ExitCode, Error> {
    let Some(canonical) = classifier::normalize(kind, name) else {
        eprintln!("`{name}` is not a valid {kind} name");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
    };
    debug!(kind = %kind, name = %canonical, "project-wide search");

    let root = PathBuf::from(".");
    let locator = build_locator(&root)?;
    let matches = locator.find_in_project(&canonical, kind).await?;
    return print_result(&aggregate(matches), json);
}

/// Print what the classifier sees at a position: the kind, the raw token
/// text, and the normalized name.
///
/// # Errors
///
/// Returns `Error::InvalidPosition` or `Error::FileNotFound`.
pub fn classify(document: &str, at: &str) -> Result<ExitCode, Error> {
    let position = parse_position(at)?;
    let doc = MarkupDocument::open(Path::new(document))?;

    if doc.mode_at(position) != DocumentMode::Markup {
        println!("not markup");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
    }

    let Some(reference) = classifier::classify(&doc, position) else {
        println!("no reference");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
    };

    return match classifier::normalize(reference.kind, &reference.raw_name) {
        Some(name) => {
            println!("{}\t{}\t{name}", reference.kind, reference.raw_name);
            Ok(ExitCode::SUCCESS)
        },
        None => {
            println!("{}\t{}\t(no identifier)", reference.kind, reference.raw_name);
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        },
    };
}

/// Wire the project corpus, the optional oracle, and the config limits
/// into a locator rooted at `root`.
///
/// # Errors
///
/// Returns `Error::TomlDe` if `.ngpeek.toml` is malformed.
fn build_locator(root: &Path) -> Result<Locator<ProjectCorpus, CommandOracle>, Error> {
    let config = Config::load(root)?;
    let oracle = config.oracle.clone().map(CommandOracle::new);
    let filter = FileFilter::Extensions(config.extensions.clone());
    let max_file_size = config.max_file_size;

    let corpus = ProjectCorpus::new(root.to_path_buf(), config);
    return Ok(Locator::new(corpus, oracle)
        .with_filter(filter)
        .with_max_file_size(max_file_size));
}

/// Parse a 1-based `LINE:COLUMN` argument into a zero-based position.
///
/// # Errors
///
/// Returns `Error::InvalidPosition` if either part is missing, not a
/// number, or zero.
fn parse_position(input: &str) -> Result<Position, Error> {
    let invalid = || return Error::InvalidPosition { input: input.to_string() };

    let (line, column) = input.split_once(':').ok_or_else(invalid)?;
    let line: u32 = line.trim().parse().map_err(|_err| return invalid())?;
    let column: u32 = column.trim().parse().map_err(|_err| return invalid())?;

    return Ok(Position::new(
        line.checked_sub(1).ok_or_else(invalid)?,
        column.checked_sub(1).ok_or_else(invalid)?,
    ));
}

/// Print a lookup outcome and pick the exit code.
///
/// # Errors
///
/// Returns `Error::Json` if JSON rendering fails.
fn print_result(result: &LocatorResult, json: bool) -> Result<ExitCode, Error> {
    if json {
        println!("{}", preview::render_json(result.matches())?);
    } else if let LocatorResult::Found(matches) = result {
        print!("{}", preview::render_text(matches));
    }

    return match result {
        LocatorResult::Found(matches) => {
            if !json {
                eprintln!("{} definition(s) found", matches.len());
            }
            Ok(ExitCode::SUCCESS)
        },
        LocatorResult::NotFound => {
            eprintln!("No definition found");
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        },
    };
}
