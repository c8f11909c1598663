use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// Lists the paths changed between two revisions in `--name-status` form,
    /// one tab-separated line per path (`M\tpath`, `R\told\tnew`).
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RefNotFound`] if either revision cannot be resolved.
    pub fn changed_lines(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let from_tree = self.resolve_tree(from)?;
        let to_tree = self.resolve_tree(to)?;

        let mut diff = self
            .inner
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), None)?;

        let mut find_opts = git2::DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        let mut lines = Vec::new();

        for delta in diff.deltas() {
            let old_file = delta.old_file().path().or_else(|| delta.new_file().path());
            let new_file = delta.new_file().path().or_else(|| delta.old_file().path());

            let (Some(old_path), Some(new_path)) = (
                old_file.and_then(std::path::Path::to_str),
                new_file.and_then(std::path::Path::to_str),
            ) else {
                return Err(GitError::NonUtf8Path);
            };

            let line = match delta.status() {
                git2::Delta::Added | git2::Delta::Copied => format!("A\t{new_path}"),
                git2::Delta::Deleted => format!("D\t{old_path}"),
                git2::Delta::Modified | git2::Delta::Typechange => format!("M\t{new_path}"),
                git2::Delta::Renamed => format!("R\t{old_path}\t{new_path}"),
                _ => continue,
            };

            lines.push(line);
        }

        Ok(lines)
    }
}
