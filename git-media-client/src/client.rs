use std::path::Path;

use git_media_spec::{EnvelopeError, META_MEDIA_TYPE, MEDIA_TYPE};
use hyper::client::HttpConnector;
use hyper::header::{
    HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT,
};
use hyper::{Body, Method, Request, Response, Uri};
use hyper_rustls::HttpsConnector;
use log::{debug, info};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::body::{body_reader, ObjectReader};
use crate::credentials::{CredentialError, CredentialProvider, Credentials, Outcome};
use crate::endpoint::Endpoint;
use crate::envelope::validate_envelope;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::progress::{Observer, ProgressReader};

const DEFAULT_USER_AGENT: &str = concat!("git-media/", env!("CARGO_PKG_VERSION"));

/// Upload bodies are streamed in chunks of this size.
const BUFFER_SIZE: usize = 64 * 1024;

pub type Transport = hyper::Client<HttpsConnector<HttpConnector>>;

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Endpoint,
    pub user_agent: HeaderValue,
}

impl Config {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        }
    }
}

/// Moves objects between the local store and a git-media server.
///
/// Each operation makes at most one request. Credentials come from `P`
/// before the request is sent, and `P` learns whether the server accepted
/// them before the operation returns.
pub struct Client<P> {
    config: Config,
    http: Transport,
    credentials: P,
}

impl<P: CredentialProvider> Client<P> {
    pub fn new(config: Config, credentials: P) -> Self {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Self::with_transport(config, hyper::Client::builder().build(https), credentials)
    }

    pub fn with_transport(config: Config, http: Transport, credentials: P) -> Self {
        Self {
            config,
            http,
            credentials,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds an empty-bodied request for `oid`, authenticated with whatever
    /// the provider returns for the object's URL.
    pub fn request(&self, method: Method, oid: &Oid) -> Result<(Request<Body>, Option<Credentials>)> {
        let url = self.config.endpoint.object_url(oid);
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", url, e)))?;
        let credentials = self.credentials.fill(&url)?;

        let mut request = Request::new(Body::empty());
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        let headers = request.headers_mut();
        headers.insert(USER_AGENT, self.config.user_agent.clone());
        if let Some(credentials) = &credentials {
            let mut authorization = HeaderValue::from_str(&credentials.authorization())
                .map_err(|_| CredentialError::InvalidHeader)?;
            authorization.set_sensitive(true);
            headers.insert(AUTHORIZATION, authorization);
        }
        Ok((request, credentials))
    }

    /// Sends `request` and reports the outcome for `credentials`.
    ///
    /// Statuses above 299 are rejections and their body is decoded into
    /// [`Error::Protocol`]. Everything else, including a failure to reach
    /// the server, counts as approval.
    pub async fn execute(
        &self,
        request: Request<Body>,
        credentials: Option<&Credentials>,
    ) -> Result<Response<Body>> {
        debug!("{} {}", request.method(), request.uri());
        let response = match self.http.request(request).await {
            Ok(response) => response,
            Err(err) => {
                self.report(Outcome::Approve, credentials);
                return Err(Error::Transport(err));
            }
        };

        let status = response.status();
        debug!("response status {}", status);
        if status.as_u16() <= 299 {
            self.report(Outcome::Approve, credentials);
            return Ok(response);
        }

        self.report(Outcome::Reject, credentials);
        let (response, body) = response.into_parts();
        let body = hyper::body::to_bytes(body).await?;
        match serde_json::from_slice(&body) {
            Ok(source) => Err(Error::Protocol { response, source }),
            Err(source) => Err(Error::Decode { response, source }),
        }
    }

    fn report(&self, outcome: Outcome, credentials: Option<&Credentials>) {
        if let Some(credentials) = credentials {
            self.credentials.report(outcome, credentials);
        }
    }

    /// Asks the server about the object stored at `path` without sending it.
    pub async fn probe(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::metadata(path)
            .await
            .map_err(Error::local_file(path))?;
        let oid = Oid::from_path(path)?;

        let (request, credentials) = self.request(Method::OPTIONS, &oid)?;
        self.execute(request, credentials.as_ref()).await?;
        Ok(())
    }

    /// Sends the object stored at `path`. `name` is only used for logging
    /// and defaults to the path itself.
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        name: Option<&str>,
        observer: impl Observer + Unpin + 'static,
    ) -> Result<()> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(Error::local_file(path))?;
        let file = File::open(path).await.map_err(Error::local_file(path))?;
        let oid = Oid::from_path(path)?;

        let (mut request, credentials) = self.request(Method::PUT, &oid)?;
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(META_MEDIA_TYPE));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(metadata.len()));
        *request.body_mut() = Body::wrap_stream(ReaderStream::with_capacity(
            ProgressReader::new(file, observer),
            BUFFER_SIZE,
        ));

        match name {
            Some(name) => info!("Sending {}", name),
            None => info!("Sending {}", path.display()),
        }
        self.execute(request, credentials.as_ref()).await?;
        Ok(())
    }

    /// Opens the object at `path`, fetching it only when there is no local
    /// copy. A local copy is returned as is, without checking its contents.
    pub async fn download(&self, path: impl AsRef<Path>) -> Result<ObjectReader> {
        let path = path.as_ref();
        if tokio::fs::metadata(path).await.is_ok() {
            let file = File::open(path).await.map_err(Error::local_file(path))?;
            return Ok(ObjectReader::Local(file));
        }
        let oid = Oid::from_path(path)?;

        let (mut request, credentials) = self.request(Method::GET, &oid)?;
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        let response = self.execute(request, credentials.as_ref()).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .ok_or(EnvelopeError::MissingContentType)?
            .to_str()
            .map_err(|_| EnvelopeError::InvalidMediaType)?
            .to_string();
        let mut body = body_reader(response.into_body());
        validate_envelope(&content_type, &mut body).await?;
        Ok(ObjectReader::Remote(body))
    }
}
