/// Core domain types for symbol references, candidate files, and match ranges.
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// The two framework constructs a markup token can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Registered with `.controller('Name', ...)`, bound through `ng-controller`.
    Controller,
    /// Registered with `.directive('name', ...)`, used as a custom tag or attribute.
    Directive,
}

impl SymbolKind {
    /// Lowercase label used in logs and CLI output.
    pub const fn label(self) -> &'static str {
        return match self {
            SymbolKind::Controller => "controller",
            SymbolKind::Directive => "directive",
        };
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.label());
    }
}

/// Produced by the classifier. `raw_name` is the literal token text,
/// before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReference {
    /// Which construct the token refers to.
    pub kind: SymbolKind,
    /// Token text as it appears in the markup.
    pub raw_name: String,
}

/// A normalized symbol name as it appears in the registration call.
/// Only the normalizer constructs these, so the inner string is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalName(
    /// The camel-case directive name or bare controller identifier.
    pub(crate) String,
);

impl CanonicalName {
    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// A file eligible for scanning. Read-only from the locator's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateFile {
    /// Short name shown to the user (project-relative path).
    pub display_name: String,
    /// Path used to read the file.
    pub full_path: PathBuf,
}

/// Zero-based line and character column inside a document. Orders by line first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number.
    pub line: u32,
    /// Character column within the line.
    pub column: u32,
}

impl Position {
    /// Build a position from zero-based line and column.
    pub const fn new(line: u32, column: u32) -> Self {
        return Self { line, column };
    }

    /// The position one column to the right on the same line.
    pub const fn next_column(self) -> Self {
        return Self {
            line: self.line,
            column: self.column.saturating_add(1),
        };
    }
}

/// Editor selection. The cursor usually sits at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Selection end (usually the cursor).
    pub end: Position,
    /// Selection start.
    pub start: Position,
}

impl Selection {
    /// A collapsed selection at a single position.
    pub const fn caret(position: Position) -> Self {
        return Self { end: position, start: position };
    }

    /// Whether the selection starts and ends on the same line.
    pub const fn is_single_line(&self) -> bool {
        return self.start.line == self.end.line;
    }
}

/// Zero-based, end-exclusive span of a registration call.
/// Field order gives the (start, end) ordering used for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TextRange {
    /// Line of the first character.
    pub start_line: u32,
    /// Column of the first character.
    pub start_column: u32,
    /// Line of the position after the last character.
    pub end_line: u32,
    /// Column of the position after the last character.
    pub end_column: u32,
}

/// One registration of the searched name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionMatch {
    /// File containing the registration.
    pub file: CandidateFile,
    /// Span of the whole registration call.
    pub range: TextRange,
}

/// Terminal value of a lookup: all matches, or an explicit not-found.
/// Never partially populated: `Found` always holds at least one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorResult {
    /// Deduplicated matches, in search order.
    Found(Vec<DefinitionMatch>),
    /// Neither tier produced a match.
    NotFound,
}

impl LocatorResult {
    /// The matches, or an empty slice when nothing was found.
    pub fn matches(&self) -> &[DefinitionMatch] {
        return match self {
            LocatorResult::Found(matches) => matches,
            LocatorResult::NotFound => &[],
        };
    }
}

/// Syntactic category of a markup token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Attribute name inside a tag.
    Attribute,
    /// Comment body, including its delimiters.
    Comment,
    /// Punctuation such as `<`, `</`, `=`, `>`, `/>`.
    Delimiter,
    /// Quoted attribute value, quotes included.
    String,
    /// Element name following `<` or `</`.
    Tag,
    /// Character data between tags.
    Text,
    /// Run of spaces or tabs.
    Whitespace,
}

/// A token on a single line. Offsets are character columns, end-exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Column after the last character.
    pub end: u32,
    /// Syntactic category.
    pub kind: TokenKind,
    /// Column of the first character.
    pub start: u32,
    /// Token text.
    pub text: String,
}

/// Whether a document position is inside markup content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMode {
    /// HTML-like markup.
    Markup,
    /// Anything else (script, style, unknown).
    Other,
}
