use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use log::debug;
use tokio::io::{AsyncRead, ReadBuf};

/// Byte counts after a read of an upload body.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Progress {
    pub bytes_so_far: u64,
    pub bytes_since_last: u64,
}

pub trait Observer: Send {
    fn observe(&mut self, progress: Progress);
}

impl<F: FnMut(Progress) + Send> Observer for F {
    fn observe(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Logs progress of a named transfer at debug level.
#[derive(Debug, Clone)]
pub struct LogObserver {
    name: String,
    total: u64,
}

impl LogObserver {
    pub fn new(name: impl Into<String>, total: u64) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }
}

impl Observer for LogObserver {
    fn observe(&mut self, progress: Progress) {
        debug!(
            "{}: {}/{} bytes",
            self.name, progress.bytes_so_far, self.total
        );
    }
}

/// Passes reads through to `inner` untouched and tells `observer` how many
/// bytes each one produced.
pub struct ProgressReader<R, O> {
    inner: R,
    observer: O,
    bytes_so_far: u64,
}

impl<R, O> ProgressReader<R, O> {
    pub fn new(inner: R, observer: O) -> Self {
        Self {
            inner,
            observer,
            bytes_so_far: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin, O: Observer + Unpin> AsyncRead for ProgressReader<R, O> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        let bytes_since_last = (buf.filled().len() - before) as u64;
        if bytes_since_last > 0 {
            this.bytes_so_far += bytes_since_last;
            this.observer.observe(Progress {
                bytes_so_far: this.bytes_so_far,
                bytes_since_last,
            });
        }
        Poll::Ready(Ok(()))
    }
}
