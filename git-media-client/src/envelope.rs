use git_media_spec::{Envelope, EnvelopeError};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Checks that `reader` starts with the boundary announced by
/// `content_type`, consuming exactly that boundary.
///
/// On error the reader is left partially consumed and must be discarded.
pub async fn validate_envelope(
    content_type: &str,
    reader: &mut (impl AsyncRead + Unpin),
) -> Result<Envelope, EnvelopeError> {
    let envelope = Envelope::from_content_type(content_type)?;
    let expected = envelope.prefix();
    let mut header = vec![0u8; expected.len()];
    reader
        .read_exact(&mut header)
        .await
        .map_err(EnvelopeError::Read)?;
    if header != expected.as_bytes() {
        return Err(EnvelopeError::InvalidHeader);
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    const CONTENT_TYPE: &str = "application/vnd.git-media; header=ABC123";

    /// Fails the test if anything tries to read it.
    struct Untouchable;

    impl AsyncRead for Untouchable {
        fn poll_read(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            panic!("body was read")
        }
    }

    #[tokio::test]
    async fn validate_envelope_leaves_reader_after_boundary() {
        let mut body: &[u8] = b"--ABC123\nhello world";
        let envelope = validate_envelope(CONTENT_TYPE, &mut body).await.unwrap();
        assert_eq!(envelope.boundary(), "ABC123");
        assert_eq!(body, b"hello world");
    }

    #[tokio::test]
    async fn validate_envelope_accepts_empty_object() {
        let mut body: &[u8] = b"--ABC123\n";
        validate_envelope(CONTENT_TYPE, &mut body).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn validate_envelope_rejects_wrong_boundary() {
        let mut body: &[u8] = b"--WRONG\nhello world";
        let err = validate_envelope(CONTENT_TYPE, &mut body).await.unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidHeader));
    }

    #[tokio::test]
    async fn validate_envelope_rejects_missing_newline() {
        let mut body: &[u8] = b"--ABC123 hello world";
        assert!(matches!(
            validate_envelope(CONTENT_TYPE, &mut body).await,
            Err(EnvelopeError::InvalidHeader)
        ));
    }

    #[tokio::test]
    async fn validate_envelope_rejects_short_body() {
        let mut body: &[u8] = b"--ABC";
        match validate_envelope(CONTENT_TYPE, &mut body).await {
            Err(EnvelopeError::Read(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn validate_envelope_checks_media_type_before_reading() {
        assert!(matches!(
            validate_envelope("text/plain; header=ABC123", &mut Untouchable).await,
            Err(EnvelopeError::InvalidMediaType)
        ));
    }

    #[tokio::test]
    async fn validate_envelope_requires_header_before_reading() {
        assert!(matches!(
            validate_envelope("application/vnd.git-media", &mut Untouchable).await,
            Err(EnvelopeError::InvalidHeader)
        ));
    }
}
