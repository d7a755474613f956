use std::fmt::{self, Display};
use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Remote key of an object: the final component of a local path.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct Oid(String);

impl Oid {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = match path.components().next_back() {
            Some(Component::Normal(name)) => name.to_str(),
            _ => None,
        }
        .ok_or_else(|| Error::InvalidOid(path.display().to_string()))?;
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(Error::InvalidOid(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
