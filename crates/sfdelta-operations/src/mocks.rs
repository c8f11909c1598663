use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::traits::{GitProvider, OutputWriter};
use crate::{OperationError, Result};

/// In-memory revisions. Each revision maps paths to file content.
#[derive(Default)]
pub struct MockGitProvider {
    lines: Vec<String>,
    revisions: HashMap<String, BTreeMap<String, Vec<u8>>>,
}

impl MockGitProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_owned());
        self
    }

    #[must_use]
    pub fn with_file(mut self, revision: &str, path: &str, content: &str) -> Self {
        self.revisions
            .entry(revision.to_owned())
            .or_default()
            .insert(path.to_owned(), content.as_bytes().to_vec());
        self
    }

    fn files(&self, revision: &str) -> Option<&BTreeMap<String, Vec<u8>>> {
        self.revisions.get(revision)
    }
}

fn is_below(path: &str, directory: &str) -> bool {
    directory.is_empty()
        || path
            .strip_prefix(directory)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl GitProvider for MockGitProvider {
    fn changed_lines(&self, _from: &str, _to: &str) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }

    fn read_file_at(&self, revision: &str, path: &str) -> Result<Vec<u8>> {
        Ok(self
            .files(revision)
            .and_then(|files| files.get(path))
            .cloned()
            .unwrap_or_default())
    }

    fn path_exists_at(&self, revision: &str, path: &str) -> Result<bool> {
        Ok(self.files(revision).is_some_and(|files| {
            files
                .keys()
                .any(|file| file == path || is_below(file, path))
        }))
    }

    fn list_files_under(&self, revision: &str, path: &str) -> Result<Vec<String>> {
        let Some(files) = self.files(revision) else {
            return Ok(Vec::new());
        };
        if files.contains_key(path) {
            return Ok(vec![path.to_owned()]);
        }
        Ok(files
            .keys()
            .filter(|file| is_below(file, path))
            .cloned()
            .collect())
    }
}

/// Records every write instead of touching the filesystem.
#[derive(Default)]
pub struct RecordingWriter {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    writes: Mutex<usize>,
}

impl RecordingWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *self.writes.lock().expect("lock poisoned")
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn content(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .expect("lock poisoned")
            .get(path)
            .map(|content| String::from_utf8_lossy(content).into_owned())
    }

    /// Written paths in sorted order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.files
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl OutputWriter for RecordingWriter {
    fn write_file(&self, relative: &str, content: &[u8]) -> Result<()> {
        self.files
            .lock()
            .map_err(|_| OperationError::LockPoisoned)?
            .insert(relative.to_owned(), content.to_vec());
        *self.writes.lock().map_err(|_| OperationError::LockPoisoned)? += 1;
        Ok(())
    }
}
