//! Incremental decoding of a row array inside a streamed JSON response.
//!
//! The response is expected to be one top-level object with a field whose
//! value is an array of rows, e.g. `{"ok":true,"rows":[{..},{..}]}`. Rows
//! are cut out of the byte stream and decoded one at a time, so memory stays
//! at one row plus the read buffer no matter how large the result is.

mod scan;

use crate::http::LiveResponse;
use scan::Scanner;
use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Field carrying the rows in SQL responses.
pub const ROWS_FIELD: &str = "rows";

/// Why a row stream ended early.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("read row stream: {0}")]
    Io(#[from] io::Error),
    #[error("malformed row stream: {0}")]
    Malformed(String),
    #[error("field {0:?} not found in response")]
    MissingField(String),
    #[error("decode row {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing read yet. The first `next` seeks the field.
    Start,
    InArray { first: bool },
    Done,
}

/// Pull-based reader over the rows of one response.
///
/// Owns the connection until the array is consumed, an error occurs, or
/// [`RowStream::release`] is called; dropping the stream also releases it.
/// Single-consumer: drive it from one thread.
pub struct RowStream<R: Read = LiveResponse> {
    scanner: Option<Scanner<R>>,
    field: String,
    state: State,
    buf: Vec<u8>,
    rows: usize,
    error: Option<StreamError>,
}

impl<R: Read> std::fmt::Debug for RowStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("field", &self.field)
            .field("state", &self.state)
            .field("rows", &self.rows)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<R: Read> RowStream<R> {
    /// Stream the array under `field` of the object read from `reader`.
    pub fn new(reader: R, field: impl Into<String>) -> Self {
        Self {
            scanner: Some(Scanner::new(reader)),
            field: field.into(),
            state: State::Start,
            buf: Vec::new(),
            rows: 0,
            error: None,
        }
    }

    /// Decode the next row into `dst`.
    ///
    /// Returns false at the end of the array or on error; check
    /// [`RowStream::last_error`] to tell them apart. Once false, every later
    /// call returns false without touching the connection.
    pub fn next<T: DeserializeOwned>(&mut self, dst: &mut T) -> bool {
        match self.next_row() {
            Some(row) => {
                *dst = row;
                true
            }
            None => false,
        }
    }

    /// Like [`RowStream::next`], returning the row by value.
    pub fn next_row<T: DeserializeOwned>(&mut self) -> Option<T> {
        match self.advance() {
            Ok(true) => match serde_json::from_slice(&self.buf) {
                Ok(row) => {
                    self.rows += 1;
                    Some(row)
                }
                Err(source) => {
                    self.fail(StreamError::Decode {
                        index: self.rows,
                        source,
                    });
                    None
                }
            },
            Ok(false) => {
                if self.scanner.is_some() {
                    tracing::debug!(field = %self.field, rows = self.rows, "row stream finished");
                }
                self.release();
                None
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    /// Error that ended the stream; `None` after a clean end.
    pub fn last_error(&self) -> Option<&StreamError> {
        self.error.as_ref()
    }

    /// Hand over the terminal error, leaving `None` behind.
    pub fn take_error(&mut self) -> Option<StreamError> {
        self.error.take()
    }

    /// Rows decoded so far.
    pub fn rows_read(&self) -> usize {
        self.rows
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Close the connection. Safe to call any number of times.
    pub fn release(&mut self) {
        self.state = State::Done;
        self.scanner = None;
    }

    fn fail(&mut self, e: StreamError) {
        tracing::debug!(field = %self.field, rows = self.rows, "row stream failed: {}", e);
        self.error = Some(e);
        self.release();
    }

    /// Capture the next element into `self.buf`. False at a clean end.
    fn advance(&mut self) -> Result<bool, StreamError> {
        let scanner = match (self.state, self.scanner.as_mut()) {
            (State::Done, _) | (_, None) => return Ok(false),
            (_, Some(s)) => s,
        };
        if self.state == State::Start {
            scanner.seek_field(&self.field, &mut self.buf)?;
            self.state = State::InArray { first: true };
        }
        let first = matches!(self.state, State::InArray { first: true });
        let more = scanner.element(first, &mut self.buf)?;
        self.state = if more {
            State::InArray { first: false }
        } else {
            State::Done
        };
        Ok(more)
    }
}

impl RowStream<LiveResponse> {
    /// Stream the `rows` array of an open SQL response.
    pub fn from_response(response: LiveResponse) -> Self {
        Self::new(response, ROWS_FIELD)
    }
}
