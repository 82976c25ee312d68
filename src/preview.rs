//! Preview construction for the CLI: show each located registration with its source.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;
use crate::types::{DefinitionMatch, TextRange};

/// Long registrations are cut after this many lines.
const MAX_PREVIEW_LINES: usize = 40;

/// One match as emitted by `--json`.
#[derive(Serialize)]
struct PreviewJson<'a> {
    /// Project-relative file name.
    file: &'a str,
    /// Path the file was read from.
    full_path: &'a Path,
    /// Zero-based range of the registration call.
    range: TextRange,
    /// Source lines covered by the range, possibly truncated.
    snippet: Vec<String>,
}

/// Caches file contents so several matches in one file read it once.
#[derive(Default)]
struct SourceCache {
    /// File contents by path; `None` if unreadable.
    files: HashMap<PathBuf, Option<String>>,
}

impl SourceCache {
    /// Source lines covered by `range`, or `None` if the file can't be read.
    fn snippet(&mut self, path: &Path, range: &TextRange) -> Option<Vec<String>> {
        let source = self
            .files
            .entry(path.to_path_buf())
            .or_insert_with(|| return std::fs::read_to_string(path).ok())
            .as_deref()?;

        let first = usize::try_from(range.start_line).ok()?;
        let mut last = usize::try_from(range.end_line).ok()?;
        // A range ending at column 0 doesn't cover that line.
        if range.end_column == 0 && last > first {
            last = last.saturating_sub(1);
        }
        let count = last.saturating_sub(first).saturating_add(1);

        return Some(
            source
                .lines()
                .skip(first)
                .take(count.min(MAX_PREVIEW_LINES))
                .map(String::from)
                .collect(),
        );
    }
}

/// Render matches as a plain-text preview: a `file:line:column` header per
/// match, then its source lines with 1-based line numbers.
pub fn render_text(matches: &[DefinitionMatch]) -> String {
    let mut cache = SourceCache::default();
    let mut out = String::new();

    for (i, m) in matches.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line = m.range.start_line.saturating_add(1);
        let column = m.range.start_column.saturating_add(1);
        let _ = writeln!(out, "{}:{line}:{column}", m.file.display_name);

        let Some(lines) = cache.snippet(&m.file.full_path, &m.range) else {
            out.push_str("    (source unavailable)\n");
            continue;
        };
        let total = m.range.end_line.saturating_sub(m.range.start_line).saturating_add(1);
        for (number, text) in (line..).zip(&lines) {
            let _ = writeln!(out, "{number:>6} | {text}");
        }
        if usize::try_from(total).unwrap_or(usize::MAX) > lines.len() && lines.len() == MAX_PREVIEW_LINES {
            out.push_str("       | ...\n");
        }
    }

    return out;
}

/// Render matches as a JSON array.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
pub fn render_json(matches: &[DefinitionMatch]) -> Result<String, Error> {
    let mut cache = SourceCache::default();
    let entries: Vec<PreviewJson<'_>> = matches
        .iter()
        .map(|m| {
            return PreviewJson {
                file: &m.file.display_name,
                full_path: &m.file.full_path,
                range: m.range,
                snippet: cache.snippet(&m.file.full_path, &m.range).unwrap_or_default(),
            };
        })
        .collect();
    return Ok(serde_json::to_string_pretty(&entries)?);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateFile;

    fn sample(dir: &Path) -> Vec<DefinitionMatch> {
        let full_path = dir.join("widgets.js");
        std::fs::write(&full_path, "// header\napp.directive('a', function () {\n  return {};\n});\n").unwrap();
        return vec![DefinitionMatch {
            file: CandidateFile {
                display_name: "widgets.js".to_string(),
                full_path,
            },
            range: TextRange {
                start_line: 1,
                start_column: 0,
                end_line: 3,
                end_column: 2,
            },
        }];
    }

    #[test]
    fn text_preview_shows_header_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let text = render_text(&sample(dir.path()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "widgets.js:2:1");
        assert_eq!(lines[1], "     2 | app.directive('a', function () {");
        assert_eq!(lines[3], "     4 | });");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn json_preview_includes_snippet() {
        let dir = tempfile::tempdir().unwrap();
        let json = render_json(&sample(dir.path())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["file"], "widgets.js");
        assert_eq!(value[0]["range"]["start_line"], 1);
        assert_eq!(value[0]["snippet"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn unreadable_source_is_reported_inline() {
        let matches = vec![DefinitionMatch {
            file: CandidateFile {
                display_name: "gone.js".to_string(),
                full_path: PathBuf::from("/definitely/not/here/gone.js"),
            },
            range: TextRange {
                start_line: 0,
                start_column: 0,
                end_line: 0,
                end_column: 5,
            },
        }];
        assert!(render_text(&matches).contains("(source unavailable)"));
    }
}
