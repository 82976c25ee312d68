use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// Name of the per-project configuration file.
pub const CONFIG_FILE: &str = ".ngpeek.toml";

/// Source files larger than this are skipped by the corpus search (16 MiB).
const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Oracle answers slower than this count as failures.
const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 2000;

/// Project configuration loaded from `.ngpeek.toml`.
/// Include/exclude patterns are path prefixes applied to corpus files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path prefixes to skip.
    exclude: Vec<String>,
    /// Extensions (without the dot) of files that form the corpus.
    pub extensions: Vec<String>,
    /// Path prefixes to scan; empty means everything.
    include: Vec<String>,
    /// Upper bound on the size of a scanned file, in bytes.
    pub max_file_size: u64,
    /// External jump-to-definition helper, if configured.
    pub oracle: Option<OracleConfig>,
}

/// How to invoke the external jump-to-definition helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// Extra arguments placed before the position arguments.
    pub args: Vec<String>,
    /// Program to run.
    pub command: String,
    /// How long to wait for an answer.
    pub timeout: Duration,
}

/// Raw TOML structure for `.ngpeek.toml`.
#[derive(serde::Deserialize)]
struct NgpeekTomlConfig {
    /// See [`Config::exclude`].
    exclude: Option<Vec<String>>,
    /// See [`Config::extensions`].
    extensions: Option<Vec<String>>,
    /// See [`Config::include`].
    #[serde(default)]
    include: Vec<String>,
    /// See [`Config::max_file_size`].
    max_file_size: Option<u64>,
    /// Optional `[oracle]` table.
    oracle: Option<OracleTomlConfig>,
}

/// Raw TOML structure for the `[oracle]` table.
#[derive(serde::Deserialize)]
struct OracleTomlConfig {
    /// See [`OracleConfig::args`].
    #[serde(default)]
    args: Vec<String>,
    /// See [`OracleConfig::command`].
    command: String,
    /// Timeout in milliseconds.
    timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            exclude: default_exclude(),
            extensions: default_extensions(),
            include: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            oracle: None,
        };
    }
}

impl Config {
    /// Load config from `.ngpeek.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        return Self::parse(&content);
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: NgpeekTomlConfig = toml::from_str(content)?;
        let oracle = raw.oracle.map(|o| {
            return OracleConfig {
                args: o.args,
                command: o.command,
                timeout: Duration::from_millis(o.timeout_ms.unwrap_or(DEFAULT_ORACLE_TIMEOUT_MS)),
            };
        });

        return Ok(Self {
            exclude: raw.exclude.unwrap_or_else(default_exclude),
            extensions: raw.extensions.unwrap_or_else(default_extensions),
            include: raw.include,
            max_file_size: raw.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
            oracle,
        });
    }

    /// Check whether a project-relative path should be part of the corpus.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }

    /// Check whether a project-relative directory is excluded, so the walk
    /// can skip its whole subtree. Only exclude patterns apply here: an
    /// include pattern may name a directory below this one.
    pub fn excludes_dir(&self, relative_dir: &str) -> bool {
        let dir = format!("{relative_dir}/");
        return self.exclude.iter().any(|p| return dir.starts_with(p.as_str()));
    }
}

/// Directories nobody wants scanned for registrations.
fn default_exclude() -> Vec<String> {
    return vec!["node_modules/".to_string(), ".git/".to_string()];
}

/// Registrations live in script files.
fn default_extensions() -> Vec<String> {
    return vec!["js".to_string()];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.extensions, vec!["js".to_string()]);
        assert!(config.oracle.is_none());
        assert!(config.should_scan("app/app.js"));
        assert!(!config.should_scan("node_modules/angular/angular.js"));
    }

    #[test]
    fn include_and_exclude_prefixes() {
        let config = Config::parse(
            r#"
include = ["app/"]
exclude = ["app/vendor/"]
"#,
        )
        .unwrap();
        assert!(config.should_scan("app/widgets.js"));
        assert!(!config.should_scan("app/vendor/lib.js"));
        assert!(!config.should_scan("test/spec.js"));
    }

    #[test]
    fn excluded_directories_are_pruned_whole() {
        let config = Config::parse(r#"include = ["app/js/"]
exclude = ["app/vendor/"]"#).unwrap();
        assert!(config.excludes_dir("app/vendor"));
        assert!(config.excludes_dir("app/vendor/angular"));
        // Parents of an include prefix stay walkable.
        assert!(!config.excludes_dir("app"));
        assert!(!config.excludes_dir("app/js"));
        assert!(Config::default().excludes_dir("node_modules"));
        assert!(Config::default().excludes_dir(".git"));
    }

    #[test]
    fn oracle_table() {
        let config = Config::parse(
            r#"
extensions = ["js", "ts"]

[oracle]
command = "tern-jump"
args = ["--json"]
timeout_ms = 500
"#,
        )
        .unwrap();
        let oracle = config.oracle.unwrap();
        assert_eq!(oracle.command, "tern-jump");
        assert_eq!(oracle.args, vec!["--json".to_string()]);
        assert_eq!(oracle.timeout, Duration::from_millis(500));
        assert_eq!(config.extensions.len(), 2);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "include = [").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }
}
