//! Pattern table: how each symbol kind is registered in script sources,
//! and matching of those registration calls inside a file.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{SymbolKind, TextRange};

/// The textual shape of a registration call for one symbol kind.
#[derive(Debug)]
pub struct SearchPattern {
    /// Symbol kind this pattern finds.
    pub kind: SymbolKind,
    /// Name of the registering method, e.g. `directive`.
    pub registrar: &'static str,
    /// Compiled call matcher. Group 1 or 2 captures the registered name.
    regex: LazyLock<Regex>,
}

/// `app.directive('name', ...)`
static DIRECTIVE_PATTERN: SearchPattern = SearchPattern {
    kind: SymbolKind::Directive,
    registrar: "directive",
    regex: LazyLock::new(|| return registration_regex("directive")),
};

/// `app.controller('Name', ...)`
static CONTROLLER_PATTERN: SearchPattern = SearchPattern {
    kind: SymbolKind::Controller,
    registrar: "controller",
    regex: LazyLock::new(|| return registration_regex("controller")),
};

/// Look up the registration pattern for a symbol kind.
pub fn pattern_for(kind: SymbolKind) -> &'static SearchPattern {
    return match kind {
        SymbolKind::Controller => &CONTROLLER_PATTERN,
        SymbolKind::Directive => &DIRECTIVE_PATTERN,
    };
}

/// Build the matcher for `receiver.registrar('name'` with an optional receiver.
///
/// # Panics
///
/// Panics if the generated regex is invalid; the registrar names are hardcoded.
#[allow(clippy::expect_used, reason = "registrar names are hardcoded identifiers")]
fn registration_regex(registrar: &str) -> Regex {
    let pattern = format!(
        r#"(?:[A-Za-z_$][\w$]*\s*)?\.\s*{registrar}\s*\(\s*(?:'([^'\\\n]*)'|"([^"\\\n]*)")"#
    );
    return Regex::new(&pattern).expect("valid registration regex");
}

impl SearchPattern {
    /// Byte ranges of every registration call in `source` whose name
    /// literal equals `name` exactly. Each range runs from the receiver
    /// through the closing parenthesis of the call.
    pub fn find_calls(&self, source: &str, name: &str) -> Vec<Range<usize>> {
        let mut calls = Vec::new();

        for caps in self.regex.captures_iter(source) {
            let Some(literal) = caps.get(1).or_else(|| return caps.get(2)) else {
                continue;
            };
            if literal.as_str() != name {
                continue;
            }
            let Some(whole) = caps.get(0) else { continue };
            let open_paren = whole
                .as_str()
                .find('(')
                .map_or(whole.end(), |offset| return whole.start().saturating_add(offset));
            calls.push(whole.start()..call_end(source, open_paren));
        }

        return calls;
    }

    /// Line/column ranges of every matching registration call in `source`.
    pub fn find_ranges(&self, source: &str, name: &str) -> Vec<TextRange> {
        let calls = self.find_calls(source, name);
        if calls.is_empty() {
            return Vec::new();
        }

        let index = LineIndex::new(source);
        return calls
            .into_iter()
            .map(|call| return index.range(source, call))
            .collect();
    }
}

/// Offset just past the parenthesis that closes the one at `open_paren`.
/// String literals and comments are skipped. Unbalanced calls run to end of input.
fn call_end(source: &str, open_paren: usize) -> usize {
    let bytes = source.as_bytes();
    let mut depth = 0_u32;
    let mut i = open_paren;

    while let Some(&b) = bytes.get(i) {
        match b {
            b'(' => depth = depth.saturating_add(1),
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i.saturating_add(1);
                }
            },
            b'\'' | b'"' | b'`' => i = skip_string(bytes, i, b),
            b'/' if bytes.get(i.saturating_add(1)) == Some(&b'/') => {
                i = skip_until(bytes, i, b"\n").saturating_sub(1);
            },
            b'/' if bytes.get(i.saturating_add(1)) == Some(&b'*') => {
                i = skip_until(bytes, i.saturating_add(2), b"*/").saturating_sub(1);
            },
            _ => {},
        }
        i = i.saturating_add(1);
    }

    return source.len();
}

/// Index of the closing quote of the string literal opened at `start`.
fn skip_string(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start.saturating_add(1);
    while let Some(&b) = bytes.get(i) {
        if b == b'\\' {
            i = i.saturating_add(2);
            continue;
        }
        if b == quote {
            return i;
        }
        i = i.saturating_add(1);
    }
    return bytes.len();
}

/// Offset just past the first `terminator` at or after `from`, or end of input.
fn skip_until(bytes: &[u8], from: usize, terminator: &[u8]) -> usize {
    let rest = bytes.get(from..).unwrap_or_default();
    return rest
        .windows(terminator.len())
        .position(|w| return w == terminator)
        .map_or(bytes.len(), |pos| return from.saturating_add(pos).saturating_add(terminator.len()));
}

/// Maps byte offsets to zero-based line and character column.
struct LineIndex {
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Record every line start in `source`.
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| return b == b'\n')
                .map(|(i, _)| return i.saturating_add(1)),
        );
        return Self { line_starts };
    }

    /// Line and character column of a byte offset.
    fn position(&self, source: &str, offset: usize) -> (u32, u32) {
        let line = self
            .line_starts
            .partition_point(|&start| return start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = source.get(line_start..offset).map_or(0, |s| return s.chars().count());
        return (
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(column).unwrap_or(u32::MAX),
        );
    }

    /// Convert a byte range into a line/column range.
    fn range(&self, source: &str, bytes: Range<usize>) -> TextRange {
        let (start_line, start_column) = self.position(source, bytes.start);
        let (end_line, end_column) = self.position(source, bytes.end);
        return TextRange {
            start_line,
            start_column,
            end_line,
            end_column,
        };
    }
}
