//! Streaming encoder of ACH files.
//!
//! [`Writer`] emits exactly what is in memory: control records are written
//! as they are, so call [`File::create`] first when the aggregates must be
//! current.

use std::io::{BufWriter, Write};

use tracing::debug;

use crate::{
    batch::{Batch, BatchBody},
    codec::RECORD_LENGTH,
    error::Result,
    file::File,
    iat_batch::IatBatch,
    record::{BLOCKING_FACTOR, FixedWidthRecord},
};

/// Line terminator put after every record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Writes ACH files to any [`Write`] sink.
///
/// Output is buffered; it is flushed after each [`write`](Writer::write).
///
/// # Example
///
/// ```no_run
/// use ach::{File, Writer};
///
/// # fn build() -> File { unimplemented!() }
/// let file: File = build();
/// let out = std::fs::File::create("payroll.ach")?;
/// let mut writer = Writer::new(out);
/// writer.write(&file)?;
/// # Ok::<(), ach::Error>(())
/// ```
pub struct Writer<W: Write> {
    inner: BufWriter<W>,
    line_ending: LineEnding,
    /// Lines written so far, filler included.
    lines_written: usize,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: BufWriter::new(writer), line_ending: LineEnding::Lf, lines_written: 0 }
    }

    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Self {
            inner: BufWriter::with_capacity(capacity, writer),
            line_ending: LineEnding::Lf,
            lines_written: 0,
        }
    }

    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Writes one file, padded with `9` filler lines to a whole block.
    pub fn write(&mut self, file: &File) -> Result<()> {
        let start = self.lines_written;
        self.line(&file.file_header.to_line())?;
        for batch in &file.batches {
            self.batch(batch)?;
        }
        for batch in &file.iat_batches {
            self.iat_batch(batch)?;
        }
        match &file.adv_file_control {
            Some(control) if file.is_adv() => self.line(&control.to_line())?,
            _ => self.line(&file.file_control.to_line())?,
        }

        let written = self.lines_written - start;
        let filler = written.next_multiple_of(BLOCKING_FACTOR) - written;
        let padding = "9".repeat(RECORD_LENGTH);
        for _ in 0..filler {
            self.line(&padding)?;
        }
        self.flush()?;
        debug!(lines = written, filler, "file written");
        Ok(())
    }

    /// Writes several files back to back.
    pub fn write_all(&mut self, files: &[File]) -> Result<()> {
        for file in files {
            self.write(file)?;
        }
        Ok(())
    }

    fn batch(&mut self, batch: &Batch) -> Result<()> {
        self.line(&batch.header().to_line())?;
        match batch.body() {
            BatchBody::Standard { entries, control } => {
                for entry in entries {
                    self.line(&entry.to_line())?;
                    for addenda in entry.addenda_records() {
                        self.line(&addenda.to_line())?;
                    }
                }
                self.line(&control.to_line())
            }
            BatchBody::Adv { entries, control } => {
                for entry in entries {
                    self.line(&entry.to_line())?;
                }
                self.line(&control.to_line())
            }
        }
    }

    fn iat_batch(&mut self, batch: &IatBatch) -> Result<()> {
        self.line(&batch.header().to_line())?;
        for entry in batch.entries() {
            self.line(&entry.to_line())?;
            for addenda in entry.addenda_records() {
                self.line(&addenda.to_line())?;
            }
        }
        self.line(&batch.batch_control().to_line())
    }

    fn line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(self.line_ending.as_str().as_bytes())?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    #[must_use]
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Unwraps the sink, flushing the buffer first.
    pub fn into_inner(self) -> std::result::Result<W, std::io::IntoInnerError<BufWriter<W>>> {
        self.inner.into_inner()
    }
}

/// Encodes `file` into a byte vector with LF line endings.
pub fn write_to_vec(file: &File) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(file.block_count() * BLOCKING_FACTOR * (RECORD_LENGTH + 1));
    Writer::new(&mut out).write(file)?;
    Ok(out)
}
