use crate::Result;

pub trait OutputWriter: Send + Sync {
    /// Writes `content` to `relative` below the output root, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the path leaves the output root or the write fails.
    fn write_file(&self, relative: &str, content: &[u8]) -> Result<()>;
}
