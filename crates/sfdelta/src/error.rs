use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("delta generation failed")]
    Operation(#[from] sfdelta_operations::OperationError),

    #[error("failed to load metadata types")]
    Registry(#[from] sfdelta_metadata::RegistryError),

    #[error("output path '{0}' is not a directory")]
    OutputNotDirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// The error and its causes on one line.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        message
    }
}
