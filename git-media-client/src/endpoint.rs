use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};
use crate::oid::Oid;

/// Base URL of a git-media object store.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Endpoint(Url);

impl Endpoint {
    pub fn new(url: Url) -> Result<Self> {
        if url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(url.to_string()));
        }
        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// `<endpoint>/objects/<oid>`, keeping the endpoint's own path and
    /// collapsing empty segments so there is exactly one slash between parts.
    pub fn object_url(&self, oid: &Oid) -> Url {
        let mut path = String::new();
        for segment in self.0.path().split('/').filter(|s| !s.is_empty()) {
            path.push('/');
            path.push_str(segment);
        }
        path.push_str("/objects/");
        path.push_str(oid.as_str());

        let mut url = self.0.clone();
        url.set_path(&path);
        url
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let url = Url::parse(s).map_err(|e| Error::InvalidEndpoint(format!("{}: {}", s, e)))?;
        Self::new(url)
    }
}
