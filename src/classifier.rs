//! Token classification at a cursor position and symbol name normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::tokenizer::TokenSource;
use crate::types::{CanonicalName, Position, SymbolKind, SymbolReference, Token, TokenKind};

/// Attribute text that binds a controller to a DOM region.
/// Matched by substring so `data-ng-controller` qualifies too.
pub const CONTROLLER_MARKER: &str = "ng-controller";

/// How many tokens to walk past when looking for an attribute's companion.
const MAX_NEIGHBOR_STEPS: usize = 6;

/// First maximal run of word characters.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static WORD: LazyLock<Regex> = LazyLock::new(|| return Regex::new(r"\w+").expect("valid regex"));

/// Direction for neighbor lookups on the cursor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Towards the start of the line.
    Backward,
    /// Towards the end of the line.
    Forward,
}

/// Read the token at `position` and decide whether it references a
/// directive or a controller. Returns `None` when it references neither;
/// callers decline silently in that case.
///
/// Controller detection wins over directive detection when both apply,
/// so `ng-controller` itself classifies as a controller reference.
pub fn classify<D: TokenSource + ?Sized>(document: &D, position: Position) -> Option<SymbolReference> {
    // At the start of a name the touching token is the preceding space or `<`.
    let token = match document.token_at(position) {
        Some(t) if !is_name_boundary(&t) => t,
        _ => document.token_at(position.next_column())?,
    };

    if let Some(reference) = controller_reference(document, position.line, &token) {
        return Some(reference);
    }

    return match token.kind {
        TokenKind::Attribute | TokenKind::Tag => Some(SymbolReference {
            kind: SymbolKind::Directive,
            raw_name: token.text,
        }),
        TokenKind::Comment
        | TokenKind::Delimiter
        | TokenKind::String
        | TokenKind::Text
        | TokenKind::Whitespace => None,
    };
}

/// Turn raw token text into the name used at the registration site.
/// Returns `None` when the text holds no identifier at all.
pub fn normalize(kind: SymbolKind, raw_name: &str) -> Option<CanonicalName> {
    let name = match kind {
        SymbolKind::Controller => WORD.find(raw_name)?.as_str().to_string(),
        SymbolKind::Directive => camel_case(raw_name.trim()),
    };

    if !WORD.is_match(&name) {
        return None;
    }
    return Some(CanonicalName(name));
}

/// Classify and normalize in one step.
pub fn reference_at<D: TokenSource + ?Sized>(
    document: &D,
    position: Position,
) -> Option<(SymbolKind, CanonicalName)> {
    let reference = classify(document, position)?;
    let name = normalize(reference.kind, &reference.raw_name)?;
    return Some((reference.kind, name));
}

/// Whitespace and delimiters such as `<` are never names themselves.
fn is_name_boundary(token: &Token) -> bool {
    return token.text.trim().is_empty() || token.kind == TokenKind::Delimiter;
}

/// Hyphen-case to camelCase: each hyphen run is dropped and the character
/// after it upper-cased. Already camel-cased input comes back unchanged.
fn camel_case(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut upper_next = false;

    for c in raw.chars() {
        if c == '-' {
            upper_next = true;
            continue;
        }
        if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }

    return result;
}

/// Detect a controller binding: either the cursor is on the bound value
/// and the attribute before it carries the marker, or the cursor is on the
/// marker attribute and the value follows it.
fn controller_reference<D: TokenSource + ?Sized>(
    document: &D,
    line: u32,
    token: &Token,
) -> Option<SymbolReference> {
    let companion = if token.text.contains(CONTROLLER_MARKER) {
        significant_neighbor(document, line, token, Direction::Forward)
            .filter(|next| return next.kind == TokenKind::String)?
    } else if token.kind == TokenKind::String {
        let previous = significant_neighbor(document, line, token, Direction::Backward)?;
        if !previous.text.contains(CONTROLLER_MARKER) {
            return None;
        }
        token.clone()
    } else {
        return None;
    };

    return Some(SymbolReference {
        kind: SymbolKind::Controller,
        raw_name: companion.text,
    });
}

/// The nearest token on the same line in `direction`, skipping whitespace
/// and the `=` between an attribute name and its value.
fn significant_neighbor<D: TokenSource + ?Sized>(
    document: &D,
    line: u32,
    token: &Token,
    direction: Direction,
) -> Option<Token> {
    let mut current = token.clone();

    for _ in 0..MAX_NEIGHBOR_STEPS {
        let neighbor = match direction {
            Direction::Backward if current.start == 0 => return None,
            Direction::Backward => document.token_at(Position::new(line, current.start))?,
            Direction::Forward => {
                document.token_at(Position::new(line, current.end.saturating_add(1)))?
            },
        };
        let skippable =
            neighbor.kind == TokenKind::Whitespace || (neighbor.kind == TokenKind::Delimiter && neighbor.text == "=");
        if !skippable {
            return Some(neighbor);
        }
        current = neighbor;
    }

    return None;
}
