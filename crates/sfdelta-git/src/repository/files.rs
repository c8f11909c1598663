use std::path::Path;

use crate::Result;

use super::Repository;

impl Repository {
    /// Reads a file as stored at `revision`.
    ///
    /// A path that is absent at the revision, or names a directory, yields empty
    /// content rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GitError::RefNotFound`] if the revision cannot be resolved.
    pub fn read_file_at(&self, revision: &str, path: &str) -> Result<Vec<u8>> {
        let tree = self.resolve_tree(revision)?;

        let Ok(entry) = tree.get_path(Path::new(path)) else {
            return Ok(Vec::new());
        };

        if entry.kind() != Some(git2::ObjectType::Blob) {
            return Ok(Vec::new());
        }

        let blob = self.inner.find_blob(entry.id())?;
        Ok(blob.content().to_vec())
    }

    /// # Errors
    ///
    /// Returns [`crate::GitError::RefNotFound`] if the revision cannot be resolved.
    pub fn path_exists_at(&self, revision: &str, path: &str) -> Result<bool> {
        let tree = self.resolve_tree(revision)?;
        if path.is_empty() {
            return Ok(true);
        }
        Ok(tree.get_path(Path::new(path)).is_ok())
    }

    /// Lists every file under `path` at `revision`, recursively.
    ///
    /// A file lists itself; a missing path lists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GitError::RefNotFound`] if the revision cannot be resolved.
    pub fn list_files_under(&self, revision: &str, path: &str) -> Result<Vec<String>> {
        let path = path.trim_end_matches('/');
        let root_tree = self.resolve_tree(revision)?;

        let tree = if path.is_empty() {
            root_tree
        } else {
            let Ok(entry) = root_tree.get_path(Path::new(path)) else {
                return Ok(Vec::new());
            };
            match entry.kind() {
                Some(git2::ObjectType::Blob) => return Ok(vec![path.to_owned()]),
                Some(git2::ObjectType::Tree) => self.inner.find_tree(entry.id())?,
                _ => return Ok(Vec::new()),
            }
        };

        let mut files = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    let relative = format!("{root}{name}");
                    if path.is_empty() {
                        files.push(relative);
                    } else {
                        files.push(format!("{path}/{relative}"));
                    }
                }
            }
            git2::TreeWalkResult::Ok
        })?;

        Ok(files)
    }
}
