use crate::media::{HEADER_PARAM, MEDIA_TYPE};

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Invalid Content-Type")]
    MissingContentType,
    #[error("Invalid Media Type")]
    InvalidMediaType,
    #[error("Invalid header")]
    InvalidHeader,
    #[error("could not read boundary header: {0}")]
    Read(#[source] std::io::Error),
}

/// Framing announced by a download's `Content-Type`, e.g.
/// `application/vnd.git-media; header=ABC123`.
///
/// A body matching this envelope starts with `--ABC123\n`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Envelope {
    boundary: String,
}

impl Envelope {
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
        }
    }

    /// Parses a `Content-Type` value. The media type must be exactly
    /// [`MEDIA_TYPE`] and a `header` parameter must be present.
    pub fn from_content_type(content_type: &str) -> Result<Self, EnvelopeError> {
        let mime: mime::Mime = content_type
            .parse()
            .map_err(|_| EnvelopeError::InvalidMediaType)?;
        if mime.essence_str() != MEDIA_TYPE {
            return Err(EnvelopeError::InvalidMediaType);
        }
        mime.get_param(HEADER_PARAM)
            .map(|boundary| Self::new(boundary.as_str()))
            .ok_or(EnvelopeError::InvalidHeader)
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Literal bytes the body must begin with.
    pub fn prefix(&self) -> String {
        format!("--{}\n", self.boundary)
    }
}
