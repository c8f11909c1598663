use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read metadata registry at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata registry from {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("directory '{directory}' is claimed by both '{first}' and '{second}'")]
    DuplicateDirectory {
        directory: String,
        first: String,
        second: String,
    },

    #[error("suffix '{suffix}' is claimed by both '{first}' and '{second}'")]
    DuplicateSuffix {
        suffix: String,
        first: String,
        second: String,
    },
}
