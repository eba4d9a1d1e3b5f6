//! Physical line handling: terminators, block padding, unterminated files.

use std::io::BufRead;

use tracing::trace;

use crate::{
    codec::RECORD_LENGTH,
    error::{RecordError, RecordErrorKind, Result},
};

/// Splits an input stream into 94-byte records.
///
/// Accepts `\n` and `\r\n` terminators, and physical lines holding several
/// records back to back. Blank lines and all-`9` filler records are skipped.
/// At most one record is buffered, however long the physical line.
pub(crate) struct LineSource<R> {
    inner: R,
    buf: Vec<u8>,
    /// Bytes of the current physical line consumed by earlier records.
    run: usize,
    /// Records seen so far, filler included.
    records: usize,
}

impl<R: BufRead> LineSource<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, buf: Vec::with_capacity(RECORD_LENGTH + 1), run: 0, records: 0 }
    }

    pub(crate) fn records(&self) -> usize {
        self.records
    }

    pub(crate) fn get_ref(&self) -> &R {
        &self.inner
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }

    /// Next record with its 1-based number, `None` at end of input.
    pub(crate) fn next_record(&mut self) -> Result<Option<(usize, String)>> {
        loop {
            let Some(terminated) = self.read_chunk()? else {
                return Ok(None);
            };
            let run = std::mem::replace(&mut self.run, 0);
            let mut bytes = self.buf.as_slice();
            if let Some(rest) = bytes.strip_suffix(b"\r") {
                bytes = rest;
            }
            if bytes.iter().all(u8::is_ascii_whitespace) {
                if !terminated {
                    self.run = run + bytes.len();
                }
                continue;
            }
            let line = self.records + 1;
            if !bytes.is_ascii() {
                return Err(RecordError::new(line, RecordErrorKind::NonAscii).into());
            }
            if bytes.len() != RECORD_LENGTH {
                let length = run + bytes.len();
                return Err(RecordError::new(line, RecordErrorKind::Length(length)).into());
            }
            if !terminated {
                self.run = run + RECORD_LENGTH;
            }
            self.records += 1;
            let record: String = bytes.iter().copied().map(char::from).collect();
            if is_filler(&record) {
                trace!(line = self.records, "skipping filler record");
                continue;
            }
            return Ok(Some((self.records, record)));
        }
    }

    /// Reads up to one record into `buf`, cut short by a `\n`. Returns `None`
    /// at end of input, otherwise whether the physical line ended.
    fn read_chunk(&mut self) -> Result<Option<bool>> {
        self.buf.clear();
        while self.buf.len() < RECORD_LENGTH {
            let available = self.inner.fill_buf()?;
            if available.is_empty() {
                return Ok((!self.buf.is_empty()).then_some(true));
            }
            let room = RECORD_LENGTH - self.buf.len();
            let window = &available[..available.len().min(room)];
            if let Some(pos) = window.iter().position(|&b| b == b'\n') {
                self.buf.extend_from_slice(&window[..pos]);
                self.inner.consume(pos + 1);
                return Ok(Some(true));
            }
            let taken = window.len();
            self.buf.extend_from_slice(window);
            self.inner.consume(taken);
        }
        let mut terminated = false;
        for terminator in [b'\r', b'\n'] {
            if self.inner.fill_buf()?.first() == Some(&terminator) {
                self.inner.consume(1);
                terminated = true;
            }
        }
        Ok(Some(terminated))
    }
}

fn is_filler(record: &str) -> bool {
    record.bytes().all(|b| b == b'9')
}
