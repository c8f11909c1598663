use std::fmt;

use crate::error::{ChangeRecordError, Result};
use crate::path::{normalize, split_segments};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    /// Carries the path the file was renamed from.
    Renamed(String),
}

impl ChangeKind {
    #[must_use]
    pub const fn status_letter(&self) -> char {
        match self {
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Modified => 'M',
            Self::Renamed(_) => 'R',
        }
    }
}

/// One changed path as reported by `git diff --name-status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    kind: ChangeKind,
    path: String,
    segments: Vec<String>,
}

impl ChangeRecord {
    #[must_use]
    pub fn new(kind: ChangeKind, path: &str) -> Self {
        let path = normalize(path);
        let segments = split_segments(&path);
        Self {
            kind,
            path,
            segments,
        }
    }

    #[must_use]
    pub fn added(path: &str) -> Self {
        Self::new(ChangeKind::Added, path)
    }

    #[must_use]
    pub fn deleted(path: &str) -> Self {
        Self::new(ChangeKind::Deleted, path)
    }

    #[must_use]
    pub fn modified(path: &str) -> Self {
        Self::new(ChangeKind::Modified, path)
    }

    #[must_use]
    pub fn renamed(from: &str, to: &str) -> Self {
        Self::new(ChangeKind::Renamed(normalize(from)), to)
    }

    /// Parses a name-status line such as `M\tclasses/Foo.cls` or
    /// `R087\tclasses/Old.cls\tclasses/New.cls`.
    ///
    /// Fields are tab separated; lines without tabs fall back to whitespace
    /// splitting. Copies are reported as additions of the destination and type
    /// changes as modifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is empty, carries an unknown status, or is
    /// missing the paths its status requires.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ChangeRecordError::EmptyLine);
        }

        let fields: Vec<&str> = if line.contains('\t') {
            line.split('\t').filter(|f| !f.is_empty()).collect()
        } else {
            line.split_whitespace().collect()
        };

        let Some((status, paths)) = fields.split_first() else {
            return Err(ChangeRecordError::EmptyLine);
        };
        let status = status.trim();

        let mut chars = status.chars();
        let letter = chars.next().unwrap_or_default();
        let score = chars.as_str();
        let unknown = || ChangeRecordError::UnknownStatus {
            status: status.to_owned(),
            line: line.to_owned(),
        };

        let first_path = || {
            paths
                .first()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ChangeRecordError::MissingPath {
                    line: line.to_owned(),
                })
        };

        match letter {
            'A' | 'D' | 'M' | 'T' if score.is_empty() => {
                let path = first_path()?;
                Ok(match letter {
                    'A' => Self::added(path),
                    'D' => Self::deleted(path),
                    _ => Self::modified(path),
                })
            }
            'R' | 'C' if score.len() <= 4 && score.chars().all(|c| c.is_ascii_digit()) => {
                let [from, to, ..] = paths else {
                    return Err(ChangeRecordError::IncompleteRename {
                        line: line.to_owned(),
                    });
                };
                if letter == 'R' {
                    Ok(Self::renamed(from.trim(), to.trim()))
                } else {
                    Ok(Self::added(to.trim()))
                }
            }
            _ => Err(unknown()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ChangeKind {
        &self.kind
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the same path with a different change kind.
    #[must_use]
    pub fn with_kind(&self, kind: ChangeKind) -> Self {
        Self {
            kind,
            path: self.path.clone(),
            segments: self.segments.clone(),
        }
    }

    /// Splits a rename into the deletion of the old path and the addition of the new one.
    /// Any other record is returned unchanged.
    #[must_use]
    pub fn decompose(&self) -> Vec<Self> {
        match &self.kind {
            ChangeKind::Renamed(from) => vec![Self::deleted(from), Self::added(&self.path)],
            _ => vec![self.clone()],
        }
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChangeKind::Renamed(from) => write!(f, "R\t{from}\t{}", self.path),
            kind => write!(f, "{}\t{}", kind.status_letter(), self.path),
        }
    }
}
