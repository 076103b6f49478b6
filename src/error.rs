use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading, extracting or configuring a document.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not list directory {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not extract archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive {} does not contain {expected}", archive.display())]
    MissingDocument { archive: PathBuf, expected: String },

    #[error("could not create extraction directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not install viewer resources into {}: {source}", path.display())]
    Resources {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
