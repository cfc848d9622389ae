//! Web call error types.

use std::{error::Error as StdError, io, path::PathBuf};

use {thiserror::Error, webcall_config::ConfigError};

use crate::method::HttpMethod;

/// Lowercased message fragments that mark an error as a timeout.
const TIMEOUT_MESSAGE_PORTIONS: [&str; 3] = ["timeout", "timed out", "time out"];

/// Errors raised while building or performing a web call.
#[derive(Debug, Error)]
pub enum WebError {
    /// Loading the properties behind a request failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client failed to build, connect, send or read.
    #[error("HTTP call failed")]
    Transport(#[from] reqwest::Error),

    /// A body or response could not be converted to or from JSON.
    #[error("failed to convert data to or from JSON")]
    Json(#[from] serde_json::Error),

    /// A charset label is not known to the decoder.
    #[error("unsupported character set: {0}")]
    UnsupportedCharset(String),

    /// The request has no target URL.
    #[error("request has no URL")]
    MissingUrl,

    /// The request has no HTTP method.
    #[error("request has no HTTP method")]
    MissingMethod,

    #[error("cannot complete a {method} operation without some form of body")]
    MissingBody { method: HttpMethod },

    #[error("cannot complete a {method} operation with a body")]
    UnexpectedBody { method: HttpMethod },

    #[error("invalid media type: {0}")]
    InvalidMediaType(String),

    /// An upload file could not be read.
    #[error("failed to read body file {}", path.display())]
    BodyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A TLS provider or JSON codec failed.
    #[error("provider {name} failed: {message}")]
    Provider { name: String, message: String },
}

impl WebError {
    /// Whether this error, or anything in its source chain, is a timeout.
    pub fn is_timeout(&self) -> bool {
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(e) = err.downcast_ref::<reqwest::Error>()
                && e.is_timeout()
            {
                return true;
            }
            if let Some(e) = err.downcast_ref::<io::Error>()
                && e.kind() == io::ErrorKind::TimedOut
            {
                return true;
            }
            let message = err.to_string().to_lowercase();
            if TIMEOUT_MESSAGE_PORTIONS.iter().any(|p| message.contains(p)) {
                return true;
            }
            current = err.source();
        }
        false
    }
}

pub type Result<T, E = WebError> = std::result::Result<T, E>;
