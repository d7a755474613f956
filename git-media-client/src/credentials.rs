use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{debug, warn};
use url::Url;

const USERNAME: &str = "username";
const PASSWORD: &str = "password";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("could not run credential helper {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential helper exited with {status}: {stderr}")]
    Helper { status: ExitStatus, stderr: String },
    #[error("credential helper returned a malformed line: {0:?}")]
    Malformed(String),
    #[error("credentials are missing {0:?}")]
    Incomplete(&'static str),
    #[error("credentials cannot be sent in an Authorization header")]
    InvalidHeader,
}

/// Username and password for one URL, along with whatever else the
/// credential store attached to them (`protocol`, `host`, `path`, ...).
#[derive(PartialEq, Eq, Clone)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(USERNAME.to_string(), username.into());
        fields.insert(PASSWORD.to_string(), password.into());
        Self(fields)
    }

    pub fn from_fields(fields: BTreeMap<String, String>) -> Result<Self, CredentialError> {
        for key in [USERNAME, PASSWORD] {
            if !fields.contains_key(key) {
                return Err(CredentialError::Incomplete(key));
            }
        }
        Ok(Self(fields))
    }

    pub fn username(&self) -> &str {
        self.get(USERNAME).unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.get(PASSWORD).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of a `Basic` Authorization header.
    pub fn authorization(&self) -> String {
        let token = format!("{}:{}", self.username(), self.password());
        format!("Basic {}", BASE64.encode(token))
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(
                self.fields()
                    .map(|(k, v)| (k, if k == PASSWORD { "<redacted>" } else { v })),
            )
            .finish()
    }
}

/// What the server made of the credentials sent with a request.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Outcome {
    /// Anything other than an HTTP error status, including transport failures.
    Approve,
    /// The server answered with a status above 299.
    Reject,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Approve => "approve",
            Outcome::Reject => "reject",
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of per-URL credentials.
///
/// `fill` runs before a request is sent. `report` runs once the response
/// (or transport failure) is known, so a store can drop credentials the
/// server refused and keep the rest.
pub trait CredentialProvider: Send + Sync {
    /// `Ok(None)` sends the request without an Authorization header.
    fn fill(&self, url: &Url) -> Result<Option<Credentials>, CredentialError>;

    fn report(&self, outcome: Outcome, credentials: &Credentials);
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for Arc<P> {
    fn fill(&self, url: &Url) -> Result<Option<Credentials>, CredentialError> {
        (**self).fill(url)
    }

    fn report(&self, outcome: Outcome, credentials: &Credentials) {
        (**self).report(outcome, credentials)
    }
}

/// Talks to `git credential`, which in turn consults the user's
/// configured helpers.
///
/// <https://git-scm.com/docs/git-credential#IOFMT>
#[derive(Debug, Clone)]
pub struct GitCredentialHelper {
    program: PathBuf,
}

impl Default for GitCredentialHelper {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCredentialHelper {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, action: &str, input: &str) -> Result<String, CredentialError> {
        let spawn_error = |source| CredentialError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(["credential", action])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(CredentialError::Helper {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CredentialProvider for GitCredentialHelper {
    fn fill(&self, url: &Url) -> Result<Option<Credentials>, CredentialError> {
        let mut fields = url_fields(url);
        let output = self.run("fill", &encode(fields.iter()))?;
        fields.extend(decode(&output)?);
        Credentials::from_fields(fields).map(Some)
    }

    fn report(&self, outcome: Outcome, credentials: &Credentials) {
        debug!("{} credentials for {:?}", outcome, credentials.get("host"));
        if let Err(err) = self.run(outcome.as_str(), &encode(credentials.fields())) {
            warn!("could not {} credentials: {}", outcome, err);
        }
    }
}

fn url_fields(url: &Url) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    fields.insert("protocol".to_string(), url.scheme().to_string());
    if let Some(host) = url.host_str() {
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        fields.insert("host".to_string(), host);
    }
    let path = url.path().trim_start_matches('/');
    if !path.is_empty() {
        fields.insert("path".to_string(), path.to_string());
    }
    if !url.username().is_empty() {
        fields.insert(USERNAME.to_string(), url.username().to_string());
    }
    fields
}

fn encode<K: Display, V: Display>(fields: impl Iterator<Item = (K, V)>) -> String {
    let mut input: String = fields.map(|(k, v)| format!("{}={}\n", k, v)).collect();
    input.push('\n');
    input
}

fn decode(output: &str) -> Result<BTreeMap<String, String>, CredentialError> {
    output
        .lines()
        .take_while(|line| !line.is_empty())
        .map(|line| {
            line.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| CredentialError::Malformed(line.to_string()))
        })
        .collect()
}
