use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::{OperationError, Result};

pub const DEFAULT_API_VERSION: &str = "62.0";
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_CONFIG_FILE: &str = "sfdelta.toml";
const MAX_DEFAULT_WORKERS: usize = 6;

/// Types whose bundle directory holds several independently deployable sites.
pub const DEFAULT_SITE_COLLECTION_TYPES: &[&str] = &["DigitalExperienceBundle"];

/// Settings of the container diff worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSettings {
    batch_size: usize,
    max_workers: usize,
}

impl Default for DiffSettings {
    fn default() -> Self {
        let available = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_workers: available.min(MAX_DEFAULT_WORKERS),
        }
    }
}

impl DiffSettings {
    /// Zero values are raised to one.
    #[must_use]
    pub fn new(batch_size: usize, max_workers: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_workers: max_workers.max(1),
        }
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

/// Glob rules keeping paths out of the package.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    global: GlobSet,
    destructive: GlobSet,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self {
            global: GlobSet::empty(),
            destructive: GlobSet::empty(),
        }
    }
}

impl IgnoreRules {
    /// # Errors
    ///
    /// Returns an error if any pattern is not a valid glob.
    pub fn new(global: &[String], destructive: &[String]) -> Result<Self> {
        Ok(Self {
            global: build_glob_set(global)?,
            destructive: build_glob_set(destructive)?,
        })
    }

    /// Globally ignored paths are neither registered nor copied.
    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        self.global.is_match(path)
    }

    /// Destructively ignored paths are never registered for deletion.
    #[must_use]
    pub fn is_ignored_for_deletion(&self, path: &str) -> bool {
        self.destructive.is_match(path)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| OperationError::GlobPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| OperationError::GlobPattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Configuration of one delta run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    from: String,
    to: String,
    generate_delta: bool,
    api_version: String,
    source: Vec<String>,
    ignore: IgnoreRules,
    site_collection_types: Vec<String>,
    diff: DiffSettings,
}

impl RunConfig {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            generate_delta: false,
            api_version: DEFAULT_API_VERSION.to_owned(),
            source: Vec::new(),
            ignore: IgnoreRules::default(),
            site_collection_types: DEFAULT_SITE_COLLECTION_TYPES
                .iter()
                .map(|t| (*t).to_owned())
                .collect(),
            diff: DiffSettings::default(),
        }
    }

    #[must_use]
    pub fn with_generate_delta(mut self, generate_delta: bool) -> Self {
        self.generate_delta = generate_delta;
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Restricts processing to paths below the given directories. Empty means
    /// the whole repository.
    #[must_use]
    pub fn with_source(mut self, source: Vec<String>) -> Self {
        self.source = source
            .iter()
            .map(|dir| sfdelta_core::path::normalize(dir).trim_end_matches('/').to_owned())
            .filter(|dir| !dir.is_empty() && dir != ".")
            .collect();
        self
    }

    #[must_use]
    pub fn with_ignore(mut self, ignore: IgnoreRules) -> Self {
        self.ignore = ignore;
        self
    }

    #[must_use]
    pub fn with_site_collection_types(mut self, types: Vec<String>) -> Self {
        self.site_collection_types = types;
        self
    }

    #[must_use]
    pub fn with_diff_settings(mut self, diff: DiffSettings) -> Self {
        self.diff = diff;
        self
    }

    #[must_use]
    pub fn from_revision(&self) -> &str {
        &self.from
    }

    /// The target revision. Copies and existence checks read from it.
    #[must_use]
    pub fn to_revision(&self) -> &str {
        &self.to
    }

    /// Whether files are materialized in addition to the manifests.
    #[must_use]
    pub fn generate_delta(&self) -> bool {
        self.generate_delta
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    #[must_use]
    pub fn ignore(&self) -> &IgnoreRules {
        &self.ignore
    }

    #[must_use]
    pub fn site_collection_types(&self) -> &[String] {
        &self.site_collection_types
    }

    #[must_use]
    pub fn diff_settings(&self) -> DiffSettings {
        self.diff
    }

    #[must_use]
    pub fn is_in_source(&self, path: &str) -> bool {
        self.source.is_empty()
            || self.source.iter().any(|dir| {
                path.strip_prefix(dir.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    delta: DeltaSection,
}

/// The `[delta]` table of `sfdelta.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeltaSection {
    pub api_version: Option<String>,
    #[serde(default)]
    pub source: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub ignore_destructive: Vec<String>,
    pub site_collection_types: Option<Vec<String>>,
    pub batch_size: Option<usize>,
    pub max_workers: Option<usize>,
    /// Type registry overrides, relative to the config file.
    pub metadata: Option<PathBuf>,
}

impl DeltaSection {
    /// Loads the `[delta]` table from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| OperationError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file: ConfigFile =
            toml::from_str(&content).map_err(|source| OperationError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        if let (Some(metadata), Some(dir)) = (file.delta.metadata.as_mut(), path.parent()) {
            if metadata.is_relative() {
                *metadata = dir.join(&*metadata);
            }
        }
        Ok(file.delta)
    }

    /// Loads `sfdelta.toml` from `repo_root` when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn discover(repo_root: &Path) -> Result<Option<Self>> {
        let path = repo_root.join(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Diff settings with file values applied over the defaults.
    #[must_use]
    pub fn diff_settings(&self) -> DiffSettings {
        let defaults = DiffSettings::default();
        DiffSettings::new(
            self.batch_size.unwrap_or(defaults.batch_size()),
            self.max_workers.unwrap_or(defaults.max_workers()),
        )
    }
}
