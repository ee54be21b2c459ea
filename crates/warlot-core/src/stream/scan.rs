//! Byte-level JSON scanning over a buffered reader.
//!
//! Just enough structure to walk one top-level object, find a named field
//! and cut array elements out of the byte stream one at a time. Element
//! bytes are captured verbatim and handed to serde_json. Values skipped on
//! the way to the field are checked with serde_json too.

use super::StreamError;
use serde::de::IgnoredAny;
use std::io::{BufRead, BufReader, Read};

/// Buffer size for the underlying reader.
const READ_BUF: usize = 16 * 1024;

pub(crate) struct Scanner<R> {
    inner: BufReader<R>,
}

fn unexpected(found: Option<u8>, wanted: &str) -> StreamError {
    match found {
        Some(b) => StreamError::Malformed(format!(
            "unexpected '{}', expected {}",
            char::from(b).escape_default(),
            wanted
        )),
        None => StreamError::Malformed(format!("unexpected end of input, expected {}", wanted)),
    }
}

impl<R: Read> Scanner<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(READ_BUF, reader),
        }
    }

    fn peek(&mut self) -> Result<Option<u8>, StreamError> {
        Ok(self.inner.fill_buf()?.first().copied())
    }

    fn bump(&mut self) {
        self.inner.consume(1);
    }

    fn next_byte(&mut self) -> Result<Option<u8>, StreamError> {
        let b = self.peek()?;
        if b.is_some() {
            self.bump();
        }
        Ok(b)
    }

    fn skip_ws(&mut self) -> Result<Option<u8>, StreamError> {
        loop {
            match self.peek()? {
                Some(b) if b.is_ascii_whitespace() => self.bump(),
                other => return Ok(other),
            }
        }
    }

    /// Walk the top-level object up to `field` and step into its array.
    ///
    /// Values of other fields are skipped whole. Ends with the reader just
    /// past the `[`.
    pub(crate) fn seek_field(&mut self, field: &str, scratch: &mut Vec<u8>) -> Result<(), StreamError> {
        match self.skip_ws()? {
            Some(b'{') => self.bump(),
            other => return Err(unexpected(other, "'{'")),
        }
        let mut first = true;
        loop {
            match self.skip_ws()? {
                Some(b'}') => return Err(StreamError::MissingField(field.to_string())),
                Some(b',') if !first => self.bump(),
                Some(_) if first => {}
                other => return Err(unexpected(other, "',' or '}'")),
            }
            first = false;

            scratch.clear();
            match self.skip_ws()? {
                Some(b'"') => self.string(scratch)?,
                other => return Err(unexpected(other, "object key")),
            }
            let key: String = serde_json::from_slice(scratch)
                .map_err(|e| StreamError::Malformed(format!("object key: {}", e)))?;
            match self.skip_ws()? {
                Some(b':') => self.bump(),
                other => return Err(unexpected(other, "':'")),
            }

            if key == field {
                return match self.skip_ws()? {
                    Some(b'[') => {
                        self.bump();
                        Ok(())
                    }
                    Some(b) => Err(StreamError::Malformed(format!(
                        "field {:?} is not an array (starts with '{}')",
                        field,
                        char::from(b).escape_default()
                    ))),
                    None => Err(unexpected(None, "'['")),
                };
            }
            scratch.clear();
            self.value(scratch)?;
            serde_json::from_slice::<IgnoredAny>(scratch)
                .map_err(|e| StreamError::Malformed(format!("field {:?}: {}", key, e)))?;
        }
    }

    /// Capture the next array element into `out`.
    ///
    /// Returns false after consuming the closing `]`.
    pub(crate) fn element(&mut self, first: bool, out: &mut Vec<u8>) -> Result<bool, StreamError> {
        out.clear();
        match self.skip_ws()? {
            Some(b']') => {
                self.bump();
                return Ok(false);
            }
            Some(b',') if !first => self.bump(),
            Some(_) if first => {}
            other => return Err(unexpected(other, "',' or ']'")),
        }
        self.value(out)?;
        Ok(true)
    }

    fn value(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        match self.skip_ws()? {
            Some(b'"') => self.string(out),
            Some(b'{') | Some(b'[') => self.composite(out),
            found @ (Some(b'}' | b']' | b',' | b':') | None) => Err(unexpected(found, "a value")),
            Some(_) => self.scalar(out),
        }
    }

    /// Reader is on the opening quote.
    fn string(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        self.bump();
        out.push(b'"');
        self.string_tail(out)
    }

    /// Copy through the closing quote; the opening quote is already in `out`.
    fn string_tail(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        loop {
            let b = self.next_byte()?.ok_or_else(|| unexpected(None, "'\"'"))?;
            out.push(b);
            match b {
                b'\\' => {
                    let esc = self.next_byte()?.ok_or_else(|| unexpected(None, "escape"))?;
                    out.push(esc);
                }
                b'"' => return Ok(()),
                _ => {}
            }
        }
    }

    /// Object or array, nested to any depth. Brackets inside strings do not count.
    fn composite(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        let mut closers: Vec<u8> = Vec::new();
        loop {
            let b = self.next_byte()?.ok_or_else(|| unexpected(None, "closing bracket"))?;
            out.push(b);
            match b {
                b'"' => self.string_tail(out)?,
                b'{' => closers.push(b'}'),
                b'[' => closers.push(b']'),
                b'}' | b']' => {
                    if closers.pop() != Some(b) {
                        return Err(unexpected(Some(b), "matching bracket"));
                    }
                    if closers.is_empty() {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Number, `true`, `false` or `null`: everything up to the next delimiter.
    fn scalar(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        while let Some(b) = self.peek()? {
            if b.is_ascii_whitespace() || matches!(b, b',' | b']' | b'}') {
                break;
            }
            out.push(b);
            self.bump();
        }
        Ok(())
    }
}
