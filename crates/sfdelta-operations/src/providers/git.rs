use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use sfdelta_git::Repository;

use crate::traits::GitProvider;
use crate::{OperationError, Result};

/// [`GitProvider`] backed by a libgit2 repository.
///
/// Every read goes through the object database, including reads at `HEAD`,
/// so uncommitted edits in the working tree never leak into a package.
pub struct Git2Provider {
    root: PathBuf,
    repository: Mutex<Repository>,
}

impl Git2Provider {
    /// # Errors
    ///
    /// Returns an error if `path` is not inside a git repository.
    pub fn open(path: &Path) -> Result<Self> {
        let repository = Repository::open(path)?;
        Ok(Self {
            root: repository.root().to_path_buf(),
            repository: Mutex::new(repository),
        })
    }

    /// Working tree root of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn repository(&self) -> Result<MutexGuard<'_, Repository>> {
        self.repository
            .lock()
            .map_err(|_| OperationError::LockPoisoned)
    }
}

impl GitProvider for Git2Provider {
    fn changed_lines(&self, from: &str, to: &str) -> Result<Vec<String>> {
        Ok(self.repository()?.changed_lines(from, to)?)
    }

    fn read_file_at(&self, revision: &str, path: &str) -> Result<Vec<u8>> {
        Ok(self.repository()?.read_file_at(revision, path)?)
    }

    fn path_exists_at(&self, revision: &str, path: &str) -> Result<bool> {
        Ok(self.repository()?.path_exists_at(revision, path)?)
    }

    fn list_files_under(&self, revision: &str, path: &str) -> Result<Vec<String>> {
        Ok(self.repository()?.list_files_under(revision, path)?)
    }
}
