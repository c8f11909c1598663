use std::collections::{HashMap, HashSet};

use sfdelta_core::Manifest;
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::metadata_diff::ContentDiff;
use crate::traits::{GitProvider, OutputWriter};

/// Collaborators a handler acts through.
pub struct Collaborators<'a> {
    pub git: &'a dyn GitProvider,
    pub writer: &'a dyn OutputWriter,
    pub differ: &'a ContentDiff,
}

/// Mutable state of one delta run.
///
/// Copies and writes are idempotent per run: a source already copied is never
/// read again, and a path is only rewritten when its content changes.
pub struct Work {
    config: RunConfig,
    pub to_add: Manifest,
    pub to_destroy: Manifest,
    warnings: Vec<String>,
    copied: HashSet<String>,
    written: HashMap<String, String>,
}

impl Work {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            to_add: Manifest::new(),
            to_destroy: Manifest::new(),
            warnings: Vec::new(),
            copied: HashSet::new(),
            written: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.warnings.push(message);
    }

    /// Copies `source`, a file or a directory, from the target revision into
    /// the output. Returns whether the source is in the output after the call.
    pub fn copy(&mut self, with: &Collaborators<'_>, source: &str) -> bool {
        if self.copied.contains(source) || self.written.contains_key(source) {
            return true;
        }
        self.copied.insert(source.to_owned());

        if self.config.ignore().is_ignored(source) {
            debug!(path = source, "copy skipped, path is ignored");
            return false;
        }

        match self.copy_files(with, source) {
            Ok(0) => {
                debug!(path = source, "nothing to copy at target revision");
                false
            }
            Ok(count) => {
                debug!(path = source, files = count, "copied");
                true
            }
            Err(error) => {
                debug!(path = source, %error, "copy failed");
                false
            }
        }
    }

    /// Returns the number of files in the output below `source`.
    fn copy_files(&mut self, with: &Collaborators<'_>, source: &str) -> crate::Result<usize> {
        let to = self.config.to_revision().to_owned();
        let mut count = 0;
        for file in with.git.list_files_under(&to, source)? {
            if self.config.ignore().is_ignored(&file) {
                continue;
            }
            if file != source && (self.copied.contains(&file) || self.written.contains_key(&file)) {
                count += 1;
                continue;
            }
            let content = with.git.read_file_at(&to, &file)?;
            with.writer.write_file(&file, &content)?;
            self.copied.insert(file);
            count += 1;
        }
        Ok(count)
    }

    /// Writes generated content to `path` in the output. Returns whether the
    /// content is in the output after the call.
    pub fn write(&mut self, with: &Collaborators<'_>, path: &str, content: &str) -> bool {
        if self.written.get(path).is_some_and(|previous| previous == content) {
            return true;
        }
        self.written.insert(path.to_owned(), content.to_owned());

        if self.config.ignore().is_ignored(path) {
            debug!(path, "write skipped, path is ignored");
            return false;
        }

        match with.writer.write_file(path, content.as_bytes()) {
            Ok(()) => true,
            Err(error) => {
                debug!(path, %error, "write failed");
                false
            }
        }
    }

    /// Drops from `to_destroy` every member that is also deployed, ignoring
    /// case in member names.
    pub fn reconcile(&mut self) {
        let Self {
            to_add, to_destroy, ..
        } = self;
        to_destroy.subtract(to_add);
    }

    /// Consumes the run state, returning both manifests and the warnings.
    #[must_use]
    pub fn into_parts(self) -> (Manifest, Manifest, Vec<String>) {
        (self.to_add, self.to_destroy, self.warnings)
    }
}
