use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::traits::OutputWriter;
use crate::{OperationError, Result};

/// Writes package files below a root directory on disk.
pub struct FileSystemOutput {
    root: PathBuf,
}

impl FileSystemOutput {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(OperationError::OutputPathEscapes(
                relative.display().to_string(),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl OutputWriter for FileSystemOutput {
    fn write_file(&self, relative: &str, content: &[u8]) -> Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| OperationError::OutputWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, content).map_err(|source| OperationError::OutputWrite { path, source })
    }
}
