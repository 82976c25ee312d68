//! Two-tier definition lookup: ask the precise oracle first, fall back to a
//! full-project scan, and aggregate whatever was found.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;
use crate::patterns::pattern_for;
use crate::perf::{Measurement, PerfTimer};
use crate::search::search;
use crate::types::{CanonicalName, CandidateFile, DefinitionMatch, LocatorResult, Position, SymbolKind};

/// What the oracle needs to know about the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    /// Document the cursor is in.
    pub document: PathBuf,
    /// Cursor position (selection start).
    pub position: Position,
}

/// An oracle answer naming the file that defines the symbol under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleTarget {
    /// Path of the defining file. Missing or empty means no usable target.
    #[serde(default)]
    pub full_path: Option<PathBuf>,
    /// Short name of the defining file.
    #[serde(default)]
    pub result_file: String,
}

impl OracleTarget {
    /// The target as a single candidate file, if it names a usable path.
    pub fn candidate(&self) -> Option<CandidateFile> {
        let full_path = self.full_path.clone().filter(|p| return !p.as_os_str().is_empty())?;
        let display_name = if self.result_file.is_empty() {
            full_path.display().to_string()
        } else {
            self.result_file.clone()
        };
        return Some(CandidateFile {
            display_name,
            full_path,
        });
    }
}

/// External precise-lookup capability (a jump-to-definition helper).
pub trait Oracle {
    /// Resolve the definition file for the cursor context.
    /// `Ok(None)` means the oracle had no answer.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup itself fails.
    fn resolve(
        &self,
        context: &QueryContext,
    ) -> impl Future<Output = Result<Option<OracleTarget>, Error>> + Send;
}

/// Which corpus files the enumerator should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFilter {
    /// Every file in the project.
    All,
    /// Files whose extension is one of these (without the dot).
    Extensions(Vec<String>),
}

impl FileFilter {
    /// Whether a file extension passes the filter.
    pub fn accepts(&self, extension: Option<&str>) -> bool {
        return match self {
            FileFilter::All => true,
            FileFilter::Extensions(allowed) => {
                extension.is_some_and(|ext| return allowed.iter().any(|a| return a.eq_ignore_ascii_case(ext)))
            },
        };
    }
}

/// External capability listing the project's candidate files.
pub trait CorpusEnumerator {
    /// List candidate files, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error when the project cannot be enumerated.
    fn list_files(
        &self,
        filter: &FileFilter,
    ) -> impl Future<Output = Result<Vec<CandidateFile>, Error>> + Send;
}

/// Sequences the oracle tier and the fallback tier. The tiers never overlap:
/// the fallback starts only after the oracle tier has definitively come up empty.
#[derive(Debug)]
pub struct Locator<E, O> {
    /// Source of the full project corpus.
    enumerator: E,
    /// Filter passed to the enumerator.
    filter: FileFilter,
    /// Files larger than this are skipped.
    max_file_size: u64,
    /// Precise lookup helper; `None` when unavailable.
    oracle: Option<O>,
}

impl<E: CorpusEnumerator, O: Oracle> Locator<E, O> {
    /// Build a locator over a corpus, with an oracle if one is available.
    pub fn new(enumerator: E, oracle: Option<O>) -> Self {
        return Self {
            enumerator,
            filter: FileFilter::All,
            max_file_size: u64::MAX,
            oracle,
        };
    }

    /// Restrict the fallback corpus.
    #[must_use]
    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        return self;
    }

    /// Skip files larger than `max_file_size` bytes.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        return self;
    }

    /// Find the registrations of `name`. Every failure along the way is
    /// absorbed: the only outcomes are matches or `NotFound`.
    pub async fn locate(
        &self,
        context: &QueryContext,
        name: &CanonicalName,
        kind: SymbolKind,
    ) -> LocatorResult {
        let timer = PerfTimer::mark_start(Measurement::InlinePreviewCreation);

        if let Some(matches) = self.oracle_tier(context, name, kind).await {
            timer.add_measurement();
            return aggregate(matches);
        }

        return match self.find_in_project(name, kind).await {
            Ok(matches) => {
                timer.add_measurement();
                aggregate(matches)
            },
            Err(e) => {
                debug!(error = %e, name = %name, "fallback enumeration failed");
                timer.finalize();
                LocatorResult::NotFound
            },
        };
    }

    /// Scan the whole project for registrations of `name`, bypassing the oracle.
    ///
    /// # Errors
    ///
    /// Returns the enumerator's error if the corpus cannot be listed.
    pub async fn find_in_project(
        &self,
        name: &CanonicalName,
        kind: SymbolKind,
    ) -> Result<Vec<DefinitionMatch>, Error> {
        let files = self.enumerator.list_files(&self.filter).await?;

        let timer = PerfTimer::mark_start(Measurement::FindInProject);
        let matches = search(pattern_for(kind), name, &files, self.max_file_size).await;
        timer.add_measurement();

        return Ok(matches);
    }

    /// Ask the oracle for the defining file and search only that file.
    /// `None` means the fallback tier has to run.
    async fn oracle_tier(
        &self,
        context: &QueryContext,
        name: &CanonicalName,
        kind: SymbolKind,
    ) -> Option<Vec<DefinitionMatch>> {
        let oracle = self.oracle.as_ref()?;
        let timer = PerfTimer::mark_start(Measurement::OracleLookup);

        let target = match oracle.resolve(context).await {
            Ok(target) => target,
            Err(e) => {
                debug!(error = %e, name = %name, "oracle failed, falling back to project scan");
                timer.finalize();
                return None;
            },
        };

        let Some(candidate) = target.as_ref().and_then(OracleTarget::candidate) else {
            debug!(name = %name, "oracle had no target, falling back to project scan");
            timer.add_measurement();
            return None;
        };

        let matches = search(pattern_for(kind), name, &[candidate], self.max_file_size).await;
        timer.add_measurement();

        if matches.is_empty() {
            debug!(name = %name, "oracle target has no registration, falling back to project scan");
            return None;
        }
        return Some(matches);
    }
}

/// Deduplicate identical `{file, range}` matches, keeping first-seen order.
/// An empty input is `NotFound`.
pub fn aggregate(matches: Vec<DefinitionMatch>) -> LocatorResult {
    let mut seen = HashSet::new();
    let unique: Vec<DefinitionMatch> = matches
        .into_iter()
        .filter(|m| return seen.insert((m.file.full_path.clone(), m.range)))
        .collect();

    if unique.is_empty() {
        return LocatorResult::NotFound;
    }
    return LocatorResult::Found(unique);
}
