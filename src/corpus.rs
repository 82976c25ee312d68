//! The filesystem corpus: every script file under the project root that the
//! configuration lets through.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;
use crate::locator::{CorpusEnumerator, FileFilter};
use crate::types::CandidateFile;

/// Enumerates candidate files under a project root on disk.
/// Applies the config's include/exclude prefixes to project-relative paths.
#[derive(Debug, Clone)]
pub struct ProjectCorpus {
    /// Project configuration.
    config: Config,
    /// Directory the walk starts from.
    root: PathBuf,
}

impl ProjectCorpus {
    /// Corpus rooted at `root`.
    pub const fn new(root: PathBuf, config: Config) -> Self {
        return Self { config, root };
    }
}

impl CorpusEnumerator for ProjectCorpus {
    async fn list_files(&self, filter: &FileFilter) -> Result<Vec<CandidateFile>, Error> {
        let root = self.root.clone();
        let config = self.config.clone();
        let filter = filter.clone();

        let files = tokio::task::spawn_blocking(move || return walk_project(&root, &config, &filter))
            .await
            .map_err(|e| {
                return Error::EnumerationFailed {
                    reason: e.to_string(),
                    root: self.root.clone(),
                };
            })?;

        debug!(root = %self.root.display(), files = files.len(), "enumerated corpus");
        return Ok(files);
    }
}

/// Walk `root` and collect every file passing the config and the filter,
/// sorted by project-relative path. Excluded directories are not descended into.
fn walk_project(root: &Path, config: &Config, filter: &FileFilter) -> Vec<CandidateFile> {
    let mut files: Vec<CandidateFile> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| return descends_into(root, config, e))
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| return filter.accepts(e.path().extension().and_then(|ext| return ext.to_str())))
        .filter_map(|e| return candidate_for(root, config, e.path()))
        .collect();

    files.sort();
    return files;
}

/// Whether the walk should visit `entry`. Directories under an exclude
/// prefix are cut off together with everything below them.
fn descends_into(root: &Path, config: &Config, entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    return !config.excludes_dir(&relative_name(root, entry.path()));
}

/// Build a candidate file if its relative path passes the include/exclude filters.
fn candidate_for(root: &Path, config: &Config, path: &Path) -> Option<CandidateFile> {
    let display_name = relative_name(root, path);
    if !config.should_scan(&display_name) {
        return None;
    }

    return Some(CandidateFile {
        display_name,
        full_path: path.to_path_buf(),
    });
}

/// Path of `path` relative to `root`, joined with forward slashes so prefix
/// matching works the same on every platform.
fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    return relative
        .components()
        .map(|c| return c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
}
