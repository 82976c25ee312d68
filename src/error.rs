/// Crate-level error types for ngpeek diagnostics.
use std::path::PathBuf;

/// Every variant names the file, command, or input that failed so the CLI
/// can print a useful diagnostic. Inside the lookup pipeline these are
/// absorbed at the tier boundary and only logged.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The project corpus could not be enumerated.
    #[error("corpus enumeration failed under {}: {reason}", root.display())]
    EnumerationFailed {
        /// Description of the failure.
        reason: String,
        /// Project root that was being walked.
        root: PathBuf,
    },

    /// A document or source file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Source file exceeds the configured size limit.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// File that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed file size in bytes.
        max_bytes: u64,
        /// Actual file size in bytes.
        size_bytes: u64,
    },

    /// A `line:column` argument could not be parsed.
    #[error("invalid position `{input}` (expected LINE:COLUMN, both starting at 1)")]
    InvalidPosition {
        /// The argument as given.
        input: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The oracle command ran but reported failure or printed garbage.
    #[error("oracle `{command}` failed: {reason}")]
    OracleFailed {
        /// Program that was run.
        command: String,
        /// Exit status or parse failure.
        reason: String,
    },

    /// The oracle command did not answer in time.
    #[error("oracle `{command}` timed out after {timeout_ms} ms")]
    OracleTimeout {
        /// Program that was run.
        command: String,
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Tree-sitter could not parse a markup document.
    #[error("parse failed for {}: {reason}", file.display())]
    ParseFailed {
        /// Document that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
