//! Client for the git-media object transfer protocol.
//!
//! Large files are kept out of a repository and stored on a server under
//! their content hash. [`Client`] probes, uploads and downloads those
//! objects, authenticating every request through a [`CredentialProvider`].

pub mod body;
pub mod client;
pub mod credentials;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod oid;
pub mod progress;

#[cfg(test)]
mod test_support;

pub use body::ObjectReader;
pub use client::{Client, Config};
pub use credentials::{CredentialError, CredentialProvider, Credentials, GitCredentialHelper, Outcome};
pub use endpoint::Endpoint;
pub use envelope::validate_envelope;
pub use error::{Error, Result};
pub use oid::Oid;
pub use progress::{LogObserver, Observer, Progress, ProgressReader};
