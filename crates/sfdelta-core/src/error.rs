use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChangeRecordError {
    #[error("change line is empty")]
    EmptyLine,

    #[error("unknown change status '{status}' in line '{line}'")]
    UnknownStatus { status: String, line: String },

    #[error("change line '{line}' has no path")]
    MissingPath { line: String },

    #[error("rename line '{line}' must carry both the old and the new path")]
    IncompleteRename { line: String },
}

pub type Result<T> = std::result::Result<T, ChangeRecordError>;
