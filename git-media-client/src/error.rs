use std::path::PathBuf;

use git_media_spec::{ApiError, EnvelopeError};
use hyper::http::response::Parts;
use hyper::StatusCode;

use crate::credentials::CredentialError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid object id: {0:?}")]
    InvalidOid(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("request failed: {0}")]
    Transport(#[from] hyper::Error),
    #[error("{source}")]
    Protocol {
        response: Parts,
        #[source]
        source: ApiError,
    },
    #[error("could not decode error response ({}): {source}", .response.status)]
    Decode {
        response: Parts,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl Error {
    pub(crate) fn local_file(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::LocalFile { path, source }
    }

    /// Status line and headers of the response that caused this error, if
    /// one arrived. Its body was consumed to decode the error.
    pub fn response(&self) -> Option<&Parts> {
        match self {
            Error::Protocol { response, .. } | Error::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|response| response.status)
    }
}
