use std::path::PathBuf;

/// Errors surfaced by the avatar client.
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    /// The identifier could not be parsed as an integer where shard selection needs one.
    #[error("invalid identifier: {0:?} is not an integer")]
    InvalidIdentifier(String),

    /// Connection, DNS or timeout failure, including failures reading the body.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("HTTP {status} for URL: {url}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Local filesystem failure (directory creation or file write).
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A batch identifier list could not be read or parsed.
    #[error("failed to read identifier list {}: {message}", .path.display())]
    IdentifierList { path: PathBuf, message: String },
}

impl AvatarError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AvatarError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AvatarError>;
