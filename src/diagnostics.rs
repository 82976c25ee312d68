use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;

/// ANSI bold, used for markdown headings.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened,
/// and how to fix it where there is an obvious fix.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::EnumerationFailed { reason, root } => render_enumeration_failed(root, reason),
        Error::InvalidPosition { input } => render_invalid_position(input),
        Error::TomlDe(e) => render_invalid_config(e),
        Error::ParseFailed { file, reason } => render_parse_failed(file, reason),
        // Search and oracle failures are absorbed by the locator and only logged.
        Error::FileNotFound { .. }
        | Error::FileTooLarge { .. }
        | Error::Io(_)
        | Error::Json(_)
        | Error::OracleFailed { .. }
        | Error::OracleTimeout { .. } => render_generic(e),
    };
}

/// Variants with nothing to suggest beyond the message itself.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::Json(e) => format!("\
# Error: JSON

{e}
"),

        _ => format!("\
# Error

{e}
"),
    };
}

/// The project directory walk could not complete.
fn render_enumeration_failed(root: &Path, reason: &str) -> String {
    return format!("\
# Error: Project Scan Failed

Could not list files under `{}`: {reason}
", root.display());
}

/// The document could not be parsed as markup.
fn render_parse_failed(file: &Path, reason: &str) -> String {
    return format!("\
# Error: Parse Failed

Could not parse `{}` as HTML: {reason}
", file.display());
}

/// `.ngpeek.toml` exists but does not parse.
fn render_invalid_config(e: &toml::de::Error) -> String {
    return format!("\
# Error: Invalid Config

`{CONFIG_FILE}` could not be parsed:

{e}
");
}

/// A `LINE:COLUMN` argument that does not parse.
fn render_invalid_position(input: &str) -> String {
    return format!("\
# Error: Invalid Position

`{input}` is not a position.

## Fix

Positions are `LINE:COLUMN`, both counted from 1:

    ngpeek peek index.html 12:8
");
}
