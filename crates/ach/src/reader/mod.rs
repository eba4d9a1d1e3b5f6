//! Streaming decoder of ACH files.
//!
//! [`Reader`] assembles a whole [`File`]; [`EntryIterator`] walks the same
//! input one entry at a time and keeps only the batch being read. Both share
//! the line source and line classification in the private submodules.

mod decode;
mod iter;
mod line;

use std::io::{BufReader, Read};

use tracing::{debug, warn};

pub use iter::EntryIterator;

use self::{
    decode::{OpenBatch, at_line, close_file, missing_file_header, parse, record_type},
    line::LineSource,
};
use crate::{
    error::{RecordError, RecordErrorKind, Result},
    file::File,
    opts::ValidateOpts,
    record::RecordType,
};

/// Where the reader stands in the file structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectFileHeader,
    /// Between batches: a batch header or the file control comes next.
    ExpectBatchOrControl,
    Done,
}

/// Reads an ACH file from any [`Read`] source.
///
/// The input is buffered internally. Structural problems stop reading with
/// a [`RecordError`] carrying the 1-based record number; conditions relaxed
/// by [`ValidateOpts`] are kept as [`warnings`](Reader::warnings) instead.
/// Reading never checks aggregates: call [`File::validate`] on the result.
///
/// # Example
///
/// ```no_run
/// use ach::Reader;
///
/// let input = std::fs::File::open("payroll.ach")?;
/// let file = Reader::new(input).read()?;
/// file.validate()?;
/// # Ok::<(), ach::Error>(())
/// ```
pub struct Reader<R> {
    lines: LineSource<BufReader<R>>,
    opts: ValidateOpts,
    warnings: Vec<RecordError>,
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineSource::new(BufReader::new(reader)),
            opts: ValidateOpts::default(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_validation(mut self, opts: ValidateOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn set_validation(&mut self, opts: ValidateOpts) {
        self.opts = opts;
    }

    #[must_use]
    pub fn validation(&self) -> &ValidateOpts {
        &self.opts
    }

    /// Problems downgraded by the validation options while reading.
    #[must_use]
    pub fn warnings(&self) -> &[RecordError] {
        &self.warnings
    }

    /// Records consumed so far, filler included.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.lines.records()
    }

    #[must_use]
    pub fn get_ref(&self) -> &R {
        self.lines.get_ref().get_ref()
    }

    pub fn into_inner(self) -> R {
        self.lines.into_inner().into_inner()
    }

    /// Walks the entries of the input instead of assembling the file.
    #[must_use]
    pub fn into_entries(self) -> EntryIterator<R> {
        EntryIterator::from_source(self.lines, self.opts)
    }

    /// Reads the remaining input as one file.
    pub fn read(&mut self) -> Result<File> {
        let mut assembler = Assembler::new(self.opts);
        while let Some((number, line)) = self.lines.next_record()? {
            let record = at_line(number, record_type(&line))?;
            let started = assembler.state != State::ExpectFileHeader;
            if assembler.state != State::Done
                && at_line(number, missing_file_header(started, record))?
            {
                self.downgrade(number, RecordErrorKind::MissingFileHeader, |o| {
                    o.allow_missing_file_header
                })?;
                assembler.state = State::ExpectBatchOrControl;
            }
            at_line(number, assembler.step(record, &line))?;
        }

        let end = self.lines.records() + 1;
        match assembler.state {
            State::ExpectFileHeader => {
                return Err(RecordError::new(end, RecordErrorKind::Empty).into());
            }
            State::ExpectBatchOrControl if assembler.current.is_some() => {
                return Err(RecordError::new(end, RecordErrorKind::MissingBatchControl).into());
            }
            State::ExpectBatchOrControl => {
                self.downgrade(end, RecordErrorKind::MissingFileControl, |o| {
                    o.allow_missing_file_control
                })?;
            }
            State::Done => {}
        }
        let file = assembler.file;
        debug!(
            records = self.lines.records(),
            batches = file.batch_count(),
            warnings = self.warnings.len(),
            "file read"
        );
        Ok(file)
    }

    /// Fails with `kind` unless `allowed` says the options tolerate it.
    fn downgrade(
        &mut self,
        line: usize,
        kind: RecordErrorKind,
        allowed: impl Fn(&ValidateOpts) -> bool,
    ) -> Result<()> {
        let error = RecordError::new(line, kind);
        if !allowed(&self.opts) {
            return Err(error.into());
        }
        warn!(%error, "continuing past structural problem");
        self.warnings.push(error);
        Ok(())
    }
}

/// Builds the file tree record by record.
struct Assembler {
    file: File,
    current: Option<OpenBatch>,
    state: State,
    opts: ValidateOpts,
}

impl Assembler {
    fn new(opts: ValidateOpts) -> Self {
        Self {
            file: File::default().with_validation(opts),
            current: None,
            state: State::ExpectFileHeader,
            opts,
        }
    }

    fn step(&mut self, record: RecordType, line: &str) -> decode::Result<()> {
        let opts = &self.opts;
        if self.state == State::Done {
            return Err(RecordErrorKind::Unexpected { record, context: "after the file control" });
        }
        match record {
            RecordType::FileHeader => {
                self.file.file_header = parse(line, opts)?;
                self.state = State::ExpectBatchOrControl;
            }
            RecordType::BatchHeader => {
                if self.current.is_some() {
                    return Err(RecordErrorKind::MissingBatchControl);
                }
                self.current = Some(OpenBatch::open(line, opts)?);
            }
            RecordType::EntryDetail => {
                self.current
                    .as_mut()
                    .ok_or(RecordErrorKind::Unexpected { record, context: "outside a batch" })?
                    .push_entry(line, opts)?;
            }
            RecordType::Addenda => {
                self.current
                    .as_mut()
                    .ok_or(RecordErrorKind::OrphanAddenda)?
                    .push_addenda(line, opts)?;
            }
            RecordType::BatchControl => {
                self.current
                    .take()
                    .ok_or(RecordErrorKind::Unexpected { record, context: "outside a batch" })?
                    .close(line, opts, &mut self.file)?;
            }
            RecordType::FileControl => {
                if self.current.is_some() {
                    return Err(RecordErrorKind::MissingBatchControl);
                }
                close_file(line, opts, &mut self.file)?;
                self.state = State::Done;
            }
        }
        Ok(())
    }
}
