//! libcurl transport.
//!
//! Each attempt runs one `Easy2` transfer on its own worker thread. The
//! handler publishes the response head before the first body byte, then body
//! chunks, then a completion frame, over a bounded channel. The caller gets a
//! `LiveResponse` as soon as the head arrives and pulls the body through
//! `std::io::Read`; the channel bound is the only buffering, so the transfer
//! advances no faster than the reader. Dropping the `LiveResponse` makes the
//! handler's next write fail, which aborts the transfer and frees the
//! connection.

use super::head::{parse_head, ResponseHead};
use super::{Headers, Method};
use crate::cancel::{CallContext, Interrupt};
use crate::error::TransportError;
use curl::easy::{Easy2, Handler, List, WriteError};
use std::io::{self, Read};
use std::str;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

/// Body chunks buffered between the worker and the reader.
const BODY_QUEUE_DEPTH: usize = 8;
/// How often the caller re-checks cancellation while waiting for the head.
const HEAD_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Fully-resolved request for one attempt.
#[derive(Debug, Clone)]
pub(crate) struct Prepared {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

/// Per-attempt limits.
#[derive(Debug, Clone)]
pub(crate) struct Limits {
    pub connect_timeout: Duration,
    /// Bounds the whole transfer, body included.
    pub timeout: Duration,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub(crate) enum SendError {
    Transport(TransportError),
    Interrupted(Interrupt),
}

enum Frame {
    Head(ResponseHead),
    Chunk(Vec<u8>),
    Done(Result<(), curl::Error>),
}

/// An open response: head already parsed, body still on the wire.
///
/// Single-owner; reading it from several threads is not supported.
pub struct LiveResponse {
    head: ResponseHead,
    body: BodyReader,
}

impl std::fmt::Debug for LiveResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveResponse")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

impl LiveResponse {
    pub fn status(&self) -> u16 {
        self.head.status
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    /// Read the remaining body to the end.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for LiveResponse {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.body.read(out)
    }
}

struct BodyReader {
    rx: Receiver<Frame>,
    chunk: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl Read for BodyReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.chunk.len() {
                let n = out.len().min(self.chunk.len() - self.pos);
                out[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished || out.is_empty() {
                return Ok(0);
            }
            match self.rx.recv() {
                Ok(Frame::Chunk(c)) => {
                    self.chunk = c;
                    self.pos = 0;
                }
                Ok(Frame::Head(_)) => {}
                Ok(Frame::Done(Ok(()))) => self.finished = true,
                Ok(Frame::Done(Err(e))) => {
                    self.finished = true;
                    return Err(io::Error::new(io::ErrorKind::Other, e));
                }
                Err(_) => {
                    self.finished = true;
                    return Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "transfer worker exited",
                    ));
                }
            }
        }
    }
}

/// Handler state for one transfer. Lives on the worker thread.
struct Collector {
    lines: Vec<String>,
    head_sent: bool,
    tx: SyncSender<Frame>,
    ctx: CallContext,
}

impl Collector {
    /// Publish the head once. False when the receiver is gone.
    fn flush_head(&mut self) -> bool {
        if self.head_sent {
            return true;
        }
        self.head_sent = true;
        self.tx.send(Frame::Head(parse_head(&self.lines))).is_ok()
    }
}

impl Handler for Collector {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                // New status line: drop headers of any interim response.
                self.lines.clear();
            }
            if !line.is_empty() {
                self.lines.push(line.to_string());
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if !self.flush_head() {
            return Ok(0);
        }
        match self.tx.send(Frame::Chunk(data.to_vec())) {
            Ok(()) => Ok(data.len()),
            // Reader released the response; a short write aborts the transfer.
            Err(_) => Ok(0),
        }
    }

    fn progress(&mut self, _dltotal: f64, _dlnow: f64, _ultotal: f64, _ulnow: f64) -> bool {
        self.ctx.interrupted().is_none()
    }
}

/// Start one attempt and block until the response head arrives.
///
/// Cancellation and the call deadline are honored while waiting; the worker
/// also checks them and aborts the transfer on its own.
pub(crate) fn send(req: Prepared, limits: &Limits) -> Result<LiveResponse, SendError> {
    let (tx, rx) = mpsc::sync_channel(BODY_QUEUE_DEPTH);
    let worker_limits = limits.clone();
    thread::Builder::new()
        .name("warlot-http".to_string())
        .spawn(move || run_transfer(req, worker_limits, tx))
        .map_err(|e| SendError::Transport(TransportError::Spawn(e)))?;

    loop {
        if let Some(i) = limits.ctx.interrupted() {
            return Err(SendError::Interrupted(i));
        }
        match rx.recv_timeout(HEAD_POLL_INTERVAL) {
            Ok(Frame::Head(head)) => {
                return Ok(LiveResponse {
                    head,
                    body: BodyReader {
                        rx,
                        chunk: Vec::new(),
                        pos: 0,
                        finished: false,
                    },
                })
            }
            Ok(Frame::Done(Err(e))) => {
                if let Some(i) = limits.ctx.interrupted() {
                    return Err(SendError::Interrupted(i));
                }
                return Err(SendError::Transport(TransportError::Curl(e)));
            }
            Ok(Frame::Done(Ok(()))) | Err(RecvTimeoutError::Disconnected) => {
                return Err(SendError::Transport(TransportError::NoResponse))
            }
            // Head always precedes chunks.
            Ok(Frame::Chunk(_)) | Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

fn run_transfer(req: Prepared, limits: Limits, tx: SyncSender<Frame>) {
    let collector = Collector {
        lines: Vec::new(),
        head_sent: false,
        tx: tx.clone(),
        ctx: limits.ctx.clone(),
    };
    let result = perform(req, &limits, collector);
    if let Err(e) = &result {
        tracing::trace!("transfer ended with error: {}", e);
    }
    let _ = tx.send(Frame::Done(result));
}

fn perform(req: Prepared, limits: &Limits, collector: Collector) -> Result<(), curl::Error> {
    let mut easy = Easy2::new(collector);
    easy.url(&req.url)?;
    match (req.method, &req.body) {
        (Method::Get, _) => easy.get(true)?,
        (Method::Post, body) => {
            easy.post(true)?;
            easy.post_fields_copy(body.as_deref().unwrap_or_default())?;
        }
        (other, body) => {
            if let Some(body) = body {
                easy.post_fields_copy(body)?;
            }
            easy.custom_request(other.as_str())?;
        }
    }
    easy.follow_location(false)?;
    easy.connect_timeout(limits.connect_timeout)?;
    easy.timeout(limits.timeout)?;
    easy.progress(true)?;

    let mut list = List::new();
    for (k, v) in &req.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    // No 100-continue round trip for JSON bodies.
    list.append("Expect:")?;
    easy.http_headers(list)?;

    easy.perform()?;
    // Bodiless responses never hit `write`.
    easy.get_mut().flush_head();
    Ok(())
}
