use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure categories, without their context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedUri,
    UnsupportedBackend,
    FileNotFound,
    Io,
    ForeignEntry,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid URI format: \"{raw}\" must be in the format <protocol>://<path>")]
    MalformedUri { raw: String },

    #[error(
        "Unsupported backend type: \"{protocol}\", supported backends: {}",
        .supported.join(", ")
    )]
    UnsupportedBackend {
        protocol: String,
        supported: Vec<String>,
    },

    #[error("file not found: {location}")]
    FileNotFound { location: String },

    #[error("I/O error on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error(
        "entry {} does not belong to the backend rooted at {}",
        .entry.display(),
        .root.display()
    )]
    ForeignEntry { entry: PathBuf, root: PathBuf },
}

impl Error {
    /// Classify an I/O failure on `location`: a missing target becomes
    /// `FileNotFound`, everything else keeps its cause as `Io`.
    pub fn from_io(location: impl Into<String>, source: io::Error) -> Self {
        let location = location.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::FileNotFound { location }
        } else {
            Error::Io { location, source }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedUri { .. } => ErrorKind::MalformedUri,
            Error::UnsupportedBackend { .. } => ErrorKind::UnsupportedBackend,
            Error::FileNotFound { .. } => ErrorKind::FileNotFound,
            Error::Io { .. } => ErrorKind::Io,
            Error::ForeignEntry { .. } => ErrorKind::ForeignEntry,
        }
    }
}
