use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Git(#[from] sfdelta_git::GitError),

    #[error(transparent)]
    Registry(#[from] sfdelta_metadata::RegistryError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid glob pattern '{pattern}'")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to write output file '{path}'")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output path '{0}' escapes the output directory")]
    OutputPathEscapes(String),

    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Failures of a single container comparison. These never abort a run; the
/// container handler records them as warnings.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("failed to parse '{path}' at revision '{revision}'")]
    Xml {
        path: String,
        revision: String,
        #[source]
        source: sfdelta_xml::XmlError,
    },

    #[error("'{tag}' element has no '{key}' to identify it")]
    MissingKey { tag: String, key: String },

    #[error("failed to start diff workers")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, OperationError>;
