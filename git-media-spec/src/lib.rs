//! Wire types for the git-media object transfer protocol.
//!
//! Objects live at `<endpoint>/objects/<oid>` and are moved with
//! `OPTIONS`, `PUT` and `GET`. Downloaded bodies are framed by a boundary
//! announced in the response's `Content-Type`, and failures come back as a
//! small JSON document.

pub mod envelope;
pub mod error;
pub mod media;

pub use envelope::{Envelope, EnvelopeError};
pub use error::ApiError;
pub use media::{META_MEDIA_TYPE, MEDIA_TYPE};
