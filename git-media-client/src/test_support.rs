//! In-process HTTP server and credential store for exercising the client.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, HeaderMap, Method, Request, Response, Server, StatusCode};
use url::Url;

use crate::credentials::{CredentialError, CredentialProvider, Credentials, Outcome};
use crate::endpoint::Endpoint;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

type Responder = Arc<dyn Fn(&Recorded) -> Response<Body> + Send + Sync>;

pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub fn start(respond: impl Fn(&Recorded) -> Response<Body> + Send + Sync + 'static) -> Self {
        let respond: Responder = Arc::new(respond);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let make_service = make_service_fn(move |_| {
            let respond = respond.clone();
            let recorded = recorded.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request: Request<Body>| {
                    let respond = respond.clone();
                    let recorded = recorded.clone();
                    async move {
                        let (parts, body) = request.into_parts();
                        let body = hyper::body::to_bytes(body).await?;
                        let request = Recorded {
                            method: parts.method,
                            path: parts.uri.path().to_string(),
                            headers: parts.headers,
                            body: body.to_vec(),
                        };
                        let response = respond(&request);
                        recorded.lock().unwrap().push(request);
                        Ok::<_, hyper::Error>(response)
                    }
                }))
            }
        });
        let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_service);
        let addr = server.local_addr();
        tokio::spawn(server);
        Self { addr, requests }
    }

    /// Replies to everything with `status` and a fixed body.
    pub fn respond_with(status: StatusCode, body: &'static str) -> Self {
        Self::start(move |_| {
            Response::builder()
                .status(status)
                .body(Body::from(body))
                .unwrap()
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        format!("http://{}/media/", self.addr).parse().unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Endpoint on a port nothing listens on.
pub fn closed_endpoint() -> Endpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/media", addr).parse().unwrap()
}

/// Hands out fixed credentials and remembers every report.
#[derive(Default)]
pub struct RecordingProvider {
    credentials: Option<Credentials>,
    fail: bool,
    filled: Mutex<Vec<Url>>,
    reports: Mutex<Vec<(Outcome, Credentials)>>,
}

impl RecordingProvider {
    pub fn with(credentials: Credentials) -> Arc<Self> {
        Arc::new(Self {
            credentials: Some(credentials),
            ..Default::default()
        })
    }

    pub fn anonymous() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn filled(&self) -> Vec<Url> {
        self.filled.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.reports.lock().unwrap().iter().map(|(o, _)| *o).collect()
    }

    pub fn reports(&self) -> Vec<(Outcome, Credentials)> {
        self.reports.lock().unwrap().clone()
    }
}

impl CredentialProvider for RecordingProvider {
    fn fill(&self, url: &Url) -> Result<Option<Credentials>, CredentialError> {
        self.filled.lock().unwrap().push(url.clone());
        if self.fail {
            return Err(CredentialError::Incomplete("password"));
        }
        Ok(self.credentials.clone())
    }

    fn report(&self, outcome: Outcome, credentials: &Credentials) {
        self.reports
            .lock()
            .unwrap()
            .push((outcome, credentials.clone()));
    }
}
