//! Markup tokenization: the capability the classifier reads tokens through,
//! plus a tree-sitter backed HTML document used by the CLI.

use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;
use crate::types::{DocumentMode, Position, Token, TokenKind};

/// Host-supplied access to a tokenized document.
pub trait TokenSource {
    /// Editor mode at a position. Script and style bodies inside markup are not markup.
    fn mode_at(&self, position: Position) -> DocumentMode;

    /// Path of the document, handed to the oracle as query context.
    fn path(&self) -> &Path;

    /// The token touching `position`: the one with `start < column <= end`,
    /// or the first token on the line when `column == 0`.
    fn token_at(&self, position: Position) -> Option<Token>;
}

/// A token plus whether it sits inside a script or style body.
#[derive(Debug, Clone)]
struct LexedToken {
    /// Inside `<script>` or `<style>`.
    raw_text: bool,
    /// The token itself.
    token: Token,
}

/// A leaf of the syntax tree, as a byte span of the whole document.
#[derive(Debug, Clone, Copy)]
struct Span {
    /// End byte, exclusive.
    end: usize,
    /// Token kind the leaf maps to.
    kind: TokenKind,
    /// Body of a script or style element.
    raw_text: bool,
    /// Start byte.
    start: usize,
}

/// An in-memory markup document with its tokens precomputed per line.
#[derive(Debug, Clone)]
pub struct MarkupDocument {
    /// Tokens grouped by line.
    lines: Vec<Vec<LexedToken>>,
    /// Document-level mode, from the file extension.
    mode: DocumentMode,
    /// Where the document came from.
    path: PathBuf,
}

impl MarkupDocument {
    /// Parse `text` as HTML. The mode is derived from the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if tree-sitter cannot parse the text.
    pub fn new(path: impl Into<PathBuf>, text: &str) -> Result<Self, Error> {
        let path = path.into();
        let mode = mode_for_path(&path);
        let tree = parse_markup(&path, text)?;

        let mut spans = Vec::new();
        collect_spans(tree.root_node(), &mut spans);
        let lines = split_lines(text, &spans);

        return Ok(Self { lines, mode, path });
    }

    /// Read and parse a document from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if the file cannot be read,
    /// or `Error::ParseFailed` if it cannot be parsed.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|_err| return Error::FileNotFound { path: path.to_path_buf() })?;
        return Self::new(path, &text);
    }

    /// Find the lexed token touching `position`.
    fn lexed_at(&self, position: Position) -> Option<&LexedToken> {
        let line = self.lines.get(usize::try_from(position.line).ok()?)?;
        if position.column == 0 {
            return line.first().filter(|t| return t.token.start == 0);
        }
        return line
            .iter()
            .find(|t| return t.token.start < position.column && position.column <= t.token.end);
    }
}

impl TokenSource for MarkupDocument {
    fn mode_at(&self, position: Position) -> DocumentMode {
        if self.mode == DocumentMode::Other {
            return DocumentMode::Other;
        }
        return match self.lexed_at(position) {
            Some(lexed) if lexed.raw_text => DocumentMode::Other,
            _ => DocumentMode::Markup,
        };
    }

    fn path(&self) -> &Path {
        return &self.path;
    }

    fn token_at(&self, position: Position) -> Option<Token> {
        return self.lexed_at(position).map(|lexed| return lexed.token.clone());
    }
}

/// Markup mode for HTML-like extensions, anything else is not markup.
fn mode_for_path(path: &Path) -> DocumentMode {
    let ext = path
        .extension()
        .and_then(|e| return e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    return match ext.as_str() {
        "htm" | "html" | "ng" | "xhtml" => DocumentMode::Markup,
        _ => DocumentMode::Other,
    };
}

/// Parse markup into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_markup(file_path: &Path, source: &str) -> Result<Tree, Error> {
    let language: Language = tree_sitter_html::LANGUAGE.into();
    let mut parser = Parser::new();
    parser.set_language(&language).map_err(|e| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;

    return parser.parse(source, None).ok_or_else(|| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

/// The token kind a node is emitted as, or `None` to descend into its children.
///
/// Quoted and unquoted attribute values are both `String`, so a bound value
/// reads the same however it is written.
fn leaf_kind(node: Node<'_>) -> Option<TokenKind> {
    return match node.kind() {
        "attribute_name" => Some(TokenKind::Attribute),
        "attribute_value" | "quoted_attribute_value" => Some(TokenKind::String),
        "comment" => Some(TokenKind::Comment),
        "doctype" | "entity" | "raw_text" | "text" => Some(TokenKind::Text),
        "erroneous_end_tag_name" | "tag_name" => Some(TokenKind::Tag),
        _ if node.child_count() == 0 && node.is_named() => Some(TokenKind::Text),
        _ if node.child_count() == 0 => Some(TokenKind::Delimiter),
        _ => None,
    };
}

/// Collect the token-sized leaves under `node` in document order.
fn collect_spans(node: Node<'_>, spans: &mut Vec<Span>) {
    if let Some(kind) = leaf_kind(node) {
        // Missing nodes inserted by error recovery have no extent.
        if node.end_byte() > node.start_byte() {
            spans.push(Span {
                end: node.end_byte(),
                kind,
                raw_text: node.kind() == "raw_text",
                start: node.start_byte(),
            });
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_spans(child, spans);
    }
}

/// Cut document-wide spans into per-line tokens with character columns.
/// Spans crossing a line break (comments, text, script bodies) yield one
/// token per line; whatever lies between spans becomes whitespace.
fn split_lines(text: &str, spans: &[Span]) -> Vec<Vec<LexedToken>> {
    let mut lines = Vec::new();
    let mut first_span = 0_usize;
    let mut line_start = 0_usize;

    for raw_line in text.lines() {
        let line_end = line_start.saturating_add(raw_line.len());
        while spans.get(first_span).is_some_and(|s| return s.end <= line_start) {
            first_span = first_span.saturating_add(1);
        }

        let mut tokens = Vec::new();
        let mut cursor = line_start;
        for span in spans.iter().skip(first_span) {
            if span.start >= line_end {
                break;
            }
            let start = span.start.max(line_start);
            let end = span.end.min(line_end);
            if start > cursor {
                tokens.push(gap_token(text, line_start, cursor, start));
            }
            if end > start {
                tokens.push(LexedToken {
                    raw_text: span.raw_text,
                    token: make_token(text, line_start, start, end, span.kind),
                });
            }
            cursor = cursor.max(end);
        }
        if line_end > cursor {
            tokens.push(gap_token(text, line_start, cursor, line_end));
        }
        lines.push(tokens);

        line_start = next_line_start(text, line_end);
    }

    return lines;
}

/// Byte offset where the line after the one ending at `line_end` begins.
fn next_line_start(text: &str, line_end: usize) -> usize {
    let rest = text.get(line_end..).unwrap_or_default();
    let terminator = if rest.starts_with("\r\n") { 2 } else { 1 };
    return line_end.saturating_add(terminator);
}

/// Text between two leaves: usually whitespace, otherwise plain text.
fn gap_token(text: &str, line_start: usize, start: usize, end: usize) -> LexedToken {
    let gap = text.get(start..end).unwrap_or_default();
    let kind = if gap.trim().is_empty() { TokenKind::Whitespace } else { TokenKind::Text };
    return LexedToken {
        raw_text: false,
        token: make_token(text, line_start, start, end, kind),
    };
}

/// Build a token from a byte span of the line starting at `line_start`.
fn make_token(text: &str, line_start: usize, start: usize, end: usize, kind: TokenKind) -> Token {
    return Token {
        end: char_column(text, line_start, end),
        kind,
        start: char_column(text, line_start, start),
        text: text.get(start..end).unwrap_or_default().to_string(),
    };
}

/// Character column of byte offset `at` on the line starting at `line_start`.
fn char_column(text: &str, line_start: usize, at: usize) -> u32 {
    let count = text.get(line_start..at).map_or(0, |prefix| return prefix.chars().count());
    return u32::try_from(count).unwrap_or(u32::MAX);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(text: &str) -> MarkupDocument {
        return MarkupDocument::new("index.html", text).unwrap();
    }

    fn kinds_and_texts(doc: &MarkupDocument, line: usize) -> Vec<(TokenKind, String)> {
        return doc.lines[line]
            .iter()
            .map(|t| return (t.token.kind, t.token.text.clone()))
            .collect();
    }

    #[test]
    fn lexes_tag_attributes_and_values() {
        let doc = html(r#"<my-widget size="2" ng-controller='MainCtrl as main'>"#);
        assert_eq!(
            kinds_and_texts(&doc, 0),
            vec![
                (TokenKind::Delimiter, "<".to_string()),
                (TokenKind::Tag, "my-widget".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Attribute, "size".to_string()),
                (TokenKind::Delimiter, "=".to_string()),
                (TokenKind::String, "\"2\"".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Attribute, "ng-controller".to_string()),
                (TokenKind::Delimiter, "=".to_string()),
                (TokenKind::String, "'MainCtrl as main'".to_string()),
                (TokenKind::Delimiter, ">".to_string()),
            ]
        );
    }

    #[test]
    fn unquoted_values_are_strings() {
        let doc = html("<body ng-controller=MainCtrl class=main>");
        assert_eq!(
            kinds_and_texts(&doc, 0),
            vec![
                (TokenKind::Delimiter, "<".to_string()),
                (TokenKind::Tag, "body".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Attribute, "ng-controller".to_string()),
                (TokenKind::Delimiter, "=".to_string()),
                (TokenKind::String, "MainCtrl".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Attribute, "class".to_string()),
                (TokenKind::Delimiter, "=".to_string()),
                (TokenKind::String, "main".to_string()),
                (TokenKind::Delimiter, ">".to_string()),
            ]
        );
    }

    #[test]
    fn token_at_prefers_token_ending_at_cursor() {
        let doc = html("<div my-attr></div>");
        // Column 5 sits between the space and `my-attr`: the space ends there.
        let token = doc.token_at(Position::new(0, 5)).unwrap();
        assert_eq!(token.kind, TokenKind::Whitespace);
        let token = doc.token_at(Position::new(0, 6)).unwrap();
        assert_eq!(token.text, "my-attr");
        let token = doc.token_at(Position::new(0, 0)).unwrap();
        assert_eq!(token.text, "<");
        assert!(doc.token_at(Position::new(0, 40)).is_none());
        assert!(doc.token_at(Position::new(3, 0)).is_none());
    }

    #[test]
    fn columns_count_characters() {
        let doc = html("<p>héllo</p> <my-widget>");
        let token = doc.token_at(Position::new(0, 15)).unwrap();
        assert_eq!(token.text, "my-widget");
        assert_eq!((token.start, token.end), (14, 23));
    }

    #[test]
    fn attributes_on_continuation_lines() {
        let doc = html("<section\n  ng-controller=\"MainCtrl\">\n  hello\n</section>");
        assert_eq!(doc.lines[1][1].token.kind, TokenKind::Attribute);
        assert_eq!(doc.lines[2][1].token.kind, TokenKind::Text);
        assert_eq!(doc.lines[3][1].token.kind, TokenKind::Tag);
    }

    #[test]
    fn comments_span_lines() {
        let doc = html("<!-- <my-widget>\n still comment --> <b>");
        assert_eq!(doc.lines[0].len(), 1);
        assert_eq!(doc.lines[0][0].token.kind, TokenKind::Comment);
        assert_eq!(doc.lines[1][0].token.kind, TokenKind::Comment);
        assert_eq!(doc.lines[1][2].token.kind, TokenKind::Delimiter);
        assert_eq!(doc.lines[1][3].token.kind, TokenKind::Tag);
    }

    #[test]
    fn script_bodies_are_not_markup() {
        let doc = html("<script>\nvar x = '<b>';\n</script>\n<p>");
        assert_eq!(doc.mode_at(Position::new(1, 3)), DocumentMode::Other);
        assert_eq!(doc.mode_at(Position::new(3, 2)), DocumentMode::Markup);
        assert_eq!(doc.lines[2][1].token.kind, TokenKind::Tag);
    }

    #[test]
    fn doctype_is_not_a_tag() {
        let doc = html("<!DOCTYPE html>\n<my-widget>");
        assert!(doc.lines[0].iter().all(|t| return t.token.kind != TokenKind::Tag));
        assert_eq!(doc.token_at(Position::new(1, 3)).unwrap().kind, TokenKind::Tag);
    }

    #[test]
    fn crlf_line_endings() {
        let doc = html("<div>\r\n  <my-widget>\r\n</div>");
        let token = doc.token_at(Position::new(1, 5)).unwrap();
        assert_eq!(token.text, "my-widget");
        assert_eq!(token.start, 3);
    }

    #[test]
    fn non_markup_extension() {
        let doc = MarkupDocument::new("app.js", "<my-widget>").unwrap();
        assert_eq!(doc.mode_at(Position::new(0, 3)), DocumentMode::Other);
    }

    #[test]
    fn markup_extensions_ignore_case() {
        for path in ["views/main.HTML", "partial.htm", "page.xhtml", "widget.ng"] {
            let doc = MarkupDocument::new(path, "<my-widget>").unwrap();
            assert_eq!(doc.mode_at(Position::new(0, 3)), DocumentMode::Markup, "{path}");
        }
    }
}
