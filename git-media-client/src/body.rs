use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::MapErr;
use futures::TryStreamExt;
use hyper::body::{Body, Bytes};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::StreamReader;

/// A response body read as bytes.
pub type BodyReader = StreamReader<MapErr<Body, fn(hyper::Error) -> io::Error>, Bytes>;

pub fn body_reader(body: Body) -> BodyReader {
    StreamReader::new(body.map_err(into_io_error as fn(hyper::Error) -> io::Error))
}

fn into_io_error(err: hyper::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

/// An object's contents, either from the local store or from the server.
pub enum ObjectReader {
    Local(File),
    Remote(BodyReader),
}

impl ObjectReader {
    pub fn is_local(&self) -> bool {
        matches!(self, ObjectReader::Local(_))
    }
}

impl fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ObjectReader::Local(file) => f.debug_tuple("Local").field(file).finish(),
            ObjectReader::Remote(_) => f.debug_tuple("Remote").finish_non_exhaustive(),
        }
    }
}

impl AsyncRead for ObjectReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            ObjectReader::Local(file) => Pin::new(file).poll_read(cx, buf),
            ObjectReader::Remote(body) => Pin::new(body).poll_read(cx, buf),
        }
    }
}
