use crate::Result;

/// Read access to the repository the delta is computed from.
///
/// Paths are repository-relative with `/` separators.
pub trait GitProvider: Send + Sync {
    /// Name-status lines for the changes between two revisions, e.g.
    /// `A\tclasses/Foo.cls` or `R087\tclasses/Old.cls\tclasses/New.cls`.
    ///
    /// # Errors
    ///
    /// Returns an error if either revision cannot be resolved or the diff fails.
    fn changed_lines(&self, from: &str, to: &str) -> Result<Vec<String>>;

    /// Content of `path` at `revision`; empty when the path is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be resolved.
    fn read_file_at(&self, revision: &str, path: &str) -> Result<Vec<u8>>;

    /// # Errors
    ///
    /// Returns an error if the revision cannot be resolved.
    fn path_exists_at(&self, revision: &str, path: &str) -> Result<bool>;

    /// Every file below `path` at `revision`, recursively. A file lists itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be resolved.
    fn list_files_under(&self, revision: &str, path: &str) -> Result<Vec<String>>;
}
