use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading property sources.
///
/// Only missing or unreadable sources surface here. Duplicate loads, unknown
/// directive schemes, unresolved placeholders and unparseable numbers are
/// absorbed by the loader.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A property file could not be opened or read.
    #[error("failed to load properties from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A resource was not found under any resource root.
    #[error("failed to load properties from resource: {path}")]
    ResourceNotFound { path: String },

    /// A resource exists but could not be read.
    #[error("failed to read resource {path}: {source}")]
    ResourceRead {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A generic byte stream failed while being read.
    #[error("failed to load properties from the input stream: {0}")]
    Stream(#[source] io::Error),

    /// Property text is malformed.
    #[error("malformed properties at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A source named by an `AdditionalPropertyFile.*` directive failed to load.
    #[error("failed to load additional properties from {directive}")]
    Include {
        directive: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Whether this error, or the include chain beneath it, is a missing source.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Read { source, .. } => source.kind() == io::ErrorKind::NotFound,
            Self::ResourceNotFound { .. } => true,
            Self::Include { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
