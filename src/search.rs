//! Corpus search: scan candidate files for registrations of a canonical name.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::Error;
use crate::patterns::SearchPattern;
use crate::types::{CanonicalName, CandidateFile, DefinitionMatch};

/// Scan every candidate file for registration calls of `name` and return
/// one match per call, sorted by file name and then by position.
///
/// Files are read and scanned concurrently; a file that cannot be read or
/// exceeds `max_file_size` is skipped without failing the search.
pub async fn search(
    pattern: &'static SearchPattern,
    name: &CanonicalName,
    files: &[CandidateFile],
    max_file_size: u64,
) -> Vec<DefinitionMatch> {
    let name = Arc::new(name.clone());
    let mut scans = JoinSet::new();

    for file in files {
        let file = file.clone();
        let name = Arc::clone(&name);
        scans.spawn(async move {
            return scan_file(pattern, &name, file, max_file_size).await;
        });
    }

    let mut matches = Vec::new();
    while let Some(joined) = scans.join_next().await {
        match joined {
            Ok(Ok(found)) => matches.extend(found),
            Ok(Err(e)) => debug!(error = %e, "skipping unreadable candidate file"),
            Err(e) => warn!(error = %e, "file scan task failed"),
        }
    }

    // Completion order is arbitrary; the output must not be.
    matches.sort_by(|a, b| return (&a.file, a.range).cmp(&(&b.file, b.range)));
    debug!(
        kind = %pattern.kind,
        registrar = pattern.registrar,
        name = %name,
        files = files.len(),
        matches = matches.len(),
        "corpus search finished"
    );
    return matches;
}

/// Read one file and collect the registration calls of `name` in it.
///
/// # Errors
///
/// Returns `Error::FileTooLarge` if the file exceeds the size limit,
/// or `Error::Io` if it cannot be read as UTF-8 text.
async fn scan_file(
    pattern: &SearchPattern,
    name: &CanonicalName,
    file: CandidateFile,
    max_file_size: u64,
) -> Result<Vec<DefinitionMatch>, Error> {
    let size_bytes = tokio::fs::metadata(&file.full_path).await?.len();
    if size_bytes > max_file_size {
        return Err(Error::FileTooLarge {
            file: file.full_path,
            max_bytes: max_file_size,
            size_bytes,
        });
    }

    let source = tokio::fs::read_to_string(&file.full_path).await?;
    let ranges = pattern.find_ranges(&source, name.as_str());

    return Ok(ranges
        .into_iter()
        .map(|range| {
            return DefinitionMatch {
                file: file.clone(),
                range,
            };
        })
        .collect());
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::classifier::normalize;
    use crate::patterns::pattern_for;
    use crate::types::SymbolKind;

    fn candidate(root: &Path, relative: &str, content: &str) -> CandidateFile {
        let full_path = root.join(relative);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        return CandidateFile {
            display_name: relative.to_string(),
            full_path,
        };
    }

    fn name(kind: SymbolKind, raw: &str) -> CanonicalName {
        return normalize(kind, raw).unwrap();
    }

    #[tokio::test]
    async fn finds_directive_at_its_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = "// filler\n".repeat(10);
        content.push_str("app.directive('myWidget', function(){ return {}; })\n");
        let files = vec![candidate(dir.path(), "widgets.js", &content)];

        let matches = search(
            pattern_for(SymbolKind::Directive),
            &name(SymbolKind::Directive, "my-widget"),
            &files,
            u64::MAX,
        )
        .await;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].file.display_name, "widgets.js");
        assert_eq!(matches[0].range.start_line, 10);
        assert_eq!(matches[0].range.end_line, 10);
    }

    #[tokio::test]
    async fn duplicate_registrations_are_all_kept_in_line_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::new();
        for line in 0..45 {
            match line {
                4 | 39 => content.push_str("app.controller('MainCtrl', function(){});\n"),
                _ => content.push('\n'),
            }
        }
        let files = vec![candidate(dir.path(), "controllers.js", &content)];

        let matches = search(
            pattern_for(SymbolKind::Controller),
            &name(SymbolKind::Controller, "MainCtrl"),
            &files,
            u64::MAX,
        )
        .await;

        let lines: Vec<u32> = matches.iter().map(|m| return m.range.start_line).collect();
        assert_eq!(lines, vec![4, 39]);
    }

    #[tokio::test]
    async fn results_are_sorted_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let registration = "app.directive('dup', f);\n";
        let files = vec![
            candidate(dir.path(), "z/late.js", registration),
            candidate(dir.path(), "a/early.js", registration),
            candidate(dir.path(), "m/middle.js", "nothing here\n"),
        ];

        let matches = search(
            pattern_for(SymbolKind::Directive),
            &name(SymbolKind::Directive, "dup"),
            &files,
            u64::MAX,
        )
        .await;

        let names: Vec<&str> = matches.iter().map(|m| return m.file.display_name.as_str()).collect();
        assert_eq!(names, vec!["a/early.js", "z/late.js"]);
    }

    #[tokio::test]
    async fn unreadable_and_oversized_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let registration = "app.directive('dup', f);\n";
        let files = vec![
            CandidateFile {
                display_name: "missing.js".to_string(),
                full_path: dir.path().join("missing.js"),
            },
            candidate(dir.path(), "big.js", &format!("{}{registration}", " ".repeat(4096))),
            candidate(dir.path(), "ok.js", registration),
        ];

        let matches = search(
            pattern_for(SymbolKind::Directive),
            &name(SymbolKind::Directive, "dup"),
            &files,
            1024,
        )
        .await;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].file.display_name, "ok.js");
    }
}
