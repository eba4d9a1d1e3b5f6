//! Entry-at-a-time walk over an ACH file.

use std::io::{BufReader, Read};

use tracing::{debug, warn};

use super::{
    decode::{
        self, at_line, attach, missing_file_header, parse, record_type, resolve_sec, sec_code,
    },
    line::LineSource,
};
use crate::{
    error::{RecordError, RecordErrorKind, Result},
    opts::ValidateOpts,
    record::{Addenda, BatchHeader, EntryDetail, FileHeader, IAT_SEC_CODE, RecordType},
    rules::SecCode,
};

/// The batch the iterator is inside of.
enum Current {
    Outside,
    /// A batch whose entries are yielded.
    Standard { header: BatchHeader, sec: SecCode },
    /// IAT and ADV batches: their lines are consumed but nothing is yielded.
    Skipped,
}

/// Lazily yields `(BatchHeader, EntryDetail)` pairs of the standard batches.
///
/// Only the header of the open batch and one entry are held at a time. An
/// entry is yielded once the record after its last addenda has been seen.
/// Aggregates are not checked. The File Header must come first unless
/// `allow_missing_file_header` is set. The first error ends the iteration.
///
/// # Example
///
/// ```no_run
/// use ach::EntryIterator;
///
/// let input = std::fs::File::open("large.ach")?;
/// let mut total = 0;
/// for item in EntryIterator::new(input) {
///     let (_header, entry) = item?;
///     total += entry.amount;
/// }
/// # Ok::<(), ach::Error>(())
/// ```
pub struct EntryIterator<R> {
    lines: LineSource<BufReader<R>>,
    opts: ValidateOpts,
    current: Current,
    pending: Option<EntryDetail>,
    started: bool,
    entries_read: usize,
    finished: bool,
}

impl<R: Read> EntryIterator<R> {
    pub fn new(reader: R) -> Self {
        Self::from_source(LineSource::new(BufReader::new(reader)), ValidateOpts::default())
    }

    pub(crate) fn from_source(lines: LineSource<BufReader<R>>, opts: ValidateOpts) -> Self {
        Self {
            lines,
            opts,
            current: Current::Outside,
            pending: None,
            started: false,
            entries_read: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn with_validation(mut self, opts: ValidateOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Entries yielded so far.
    #[must_use]
    pub fn entries_read(&self) -> usize {
        self.entries_read
    }

    #[must_use]
    pub fn records_read(&self) -> usize {
        self.lines.records()
    }

    pub fn into_inner(self) -> R {
        self.lines.into_inner().into_inner()
    }

    fn advance(&mut self) -> Result<Option<(BatchHeader, EntryDetail)>> {
        while let Some((number, line)) = self.lines.next_record()? {
            let record = at_line(number, record_type(&line))?;
            if at_line(number, missing_file_header(self.started, record))? {
                let error = RecordError::new(number, RecordErrorKind::MissingFileHeader);
                if !self.opts.allow_missing_file_header {
                    return Err(error.into());
                }
                warn!(%error, "continuing past structural problem");
            }
            self.started = true;
            if let Some(item) = at_line(number, self.step(record, &line))? {
                return Ok(Some(item));
            }
            if self.finished {
                return Ok(None);
            }
        }
        if !matches!(self.current, Current::Outside) {
            let end = self.lines.records() + 1;
            return Err(RecordError::new(end, RecordErrorKind::MissingBatchControl).into());
        }
        Ok(None)
    }

    fn step(
        &mut self,
        record: RecordType,
        line: &str,
    ) -> decode::Result<Option<(BatchHeader, EntryDetail)>> {
        let inside = !matches!(self.current, Current::Outside);
        match record {
            RecordType::FileHeader => {
                parse::<FileHeader>(line, &self.opts)?;
                Ok(None)
            }
            RecordType::BatchHeader => {
                if inside {
                    return Err(RecordErrorKind::MissingBatchControl);
                }
                self.current = self.open(line)?;
                Ok(None)
            }
            RecordType::EntryDetail => {
                if !inside {
                    return Err(RecordErrorKind::Unexpected { record, context: "outside a batch" });
                }
                let ready = self.take_pending();
                if matches!(self.current, Current::Standard { .. }) {
                    self.pending = Some(parse(line, &self.opts)?);
                }
                Ok(ready)
            }
            RecordType::Addenda => {
                if let Current::Standard { sec, .. } = self.current {
                    let addenda = Addenda::parse_with(line, self.opts.preserve_spaces)?;
                    let entry = self.pending.as_mut().ok_or(RecordErrorKind::OrphanAddenda)?;
                    attach(entry, sec, addenda)?;
                } else if !inside {
                    return Err(RecordErrorKind::OrphanAddenda);
                }
                Ok(None)
            }
            RecordType::BatchControl => {
                if !inside {
                    return Err(RecordErrorKind::Unexpected { record, context: "outside a batch" });
                }
                let ready = self.take_pending();
                self.current = Current::Outside;
                Ok(ready)
            }
            RecordType::FileControl => {
                if inside {
                    return Err(RecordErrorKind::MissingBatchControl);
                }
                self.finished = true;
                Ok(None)
            }
        }
    }

    fn open(&self, line: &str) -> decode::Result<Current> {
        let code = sec_code(line);
        if code == IAT_SEC_CODE {
            return Ok(Current::Skipped);
        }
        let sec = resolve_sec(code)?;
        if sec == SecCode::Adv {
            return Ok(Current::Skipped);
        }
        let header = parse(line, &self.opts)?;
        Ok(Current::Standard { header, sec })
    }

    fn take_pending(&mut self) -> Option<(BatchHeader, EntryDetail)> {
        let entry = self.pending.take()?;
        match &self.current {
            Current::Standard { header, .. } => Some((header.clone(), entry)),
            _ => None,
        }
    }
}

impl<R: Read> Iterator for EntryIterator<R> {
    type Item = Result<(BatchHeader, EntryDetail)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.advance() {
            Ok(Some(item)) => {
                self.entries_read += 1;
                Some(Ok(item))
            }
            Ok(None) => {
                self.finished = true;
                debug!(entries = self.entries_read, records = self.records_read(), "entries read");
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        io::{self, Cursor},
        rc::Rc,
    };

    use super::*;
    use crate::{
        batch::tests::{credit, debit, ppd_batch},
        error::Error,
        file::{
            File,
            tests::{file_header, ppd_file},
        },
        iat_batch::tests::iat_batch,
        record::Addenda05,
        writer::write_to_vec,
    };

    fn entries(file: &File) -> Vec<Result<(BatchHeader, EntryDetail)>> {
        EntryIterator::new(Cursor::new(write_to_vec(file).unwrap())).collect()
    }

    #[test]
    fn test_yields_every_entry() {
        let file = ppd_file();
        let items = entries(&file);
        assert_eq!(items.len(), 2);
        let expected = file.batches[0].entries();
        for (item, entry) in items.into_iter().zip(expected) {
            let (header, read) = item.unwrap();
            assert_eq!(&header, file.batches[0].header());
            assert_eq!(&read, entry);
        }
    }

    #[test]
    fn test_addenda_attached() {
        let mut entry = credit(1_000);
        entry.add_addenda(Addenda::Addenda05(Addenda05::new("invoice 42"))).unwrap();
        entry.add_addenda(Addenda::Addenda05(Addenda05::new("invoice 43"))).unwrap();
        let mut file = File::new(file_header());
        file.add_batch(ppd_batch(vec![entry, debit(1_000)]));
        file.create().unwrap();

        let items: Vec<_> = entries(&file).into_iter().map(|r| r.unwrap().1).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].addenda05.len(), 2);
        assert_eq!(items[0].addenda05[1].payment_related_information, "invoice 43");
        assert!(items[1].addenda05.is_empty());
    }

    #[test]
    fn test_iat_batches_skipped() {
        let mut file = ppd_file();
        let mut iat = iat_batch();
        iat.set_batch_number(2);
        iat.create().unwrap();
        file.add_iat_batch(iat);
        file.create().unwrap();
        let items = entries(&file);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(Result::is_ok));
    }

    #[test]
    fn test_open_batch_at_end() {
        let text = String::from_utf8(write_to_vec(&ppd_file()).unwrap()).unwrap();
        let truncated: Vec<&str> = text.lines().take(4).collect();
        let mut iter = EntryIterator::new(Cursor::new(truncated.join("\n")));
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(
            iter.next(),
            Some(Err(Error::Record(RecordError {
                line: 5,
                kind: RecordErrorKind::MissingBatchControl
            })))
        ));
        assert!(iter.next().is_none());
        assert_eq!(iter.entries_read(), 1);
    }

    #[test]
    fn test_missing_file_header() {
        let text = String::from_utf8(write_to_vec(&ppd_file()).unwrap()).unwrap();
        let body: Vec<&str> = text.lines().skip(1).collect();
        let body = body.join("\n");

        let mut iter = EntryIterator::new(Cursor::new(body.clone()));
        assert!(matches!(
            iter.next(),
            Some(Err(Error::Record(RecordError {
                line: 1,
                kind: RecordErrorKind::MissingFileHeader
            })))
        ));
        assert!(iter.next().is_none());

        let opts = ValidateOpts { allow_missing_file_header: true, ..Default::default() };
        let iter = EntryIterator::new(Cursor::new(body)).with_validation(opts);
        assert_eq!(iter.filter(Result::is_ok).count(), 2);
    }

    #[test]
    fn test_file_header_after_first_record() {
        let text = String::from_utf8(write_to_vec(&ppd_file()).unwrap()).unwrap();
        let mut lines: Vec<&str> = text.lines().collect();
        let header = lines[0];
        lines.insert(1, header);
        let mut iter = EntryIterator::new(Cursor::new(lines.join("\n")));
        assert!(matches!(
            iter.next(),
            Some(Err(Error::Record(RecordError {
                line: 2,
                kind: RecordErrorKind::Unexpected { record: RecordType::FileHeader, .. }
            })))
        ));
    }

    /// Counts the bytes pulled from the wrapped input.
    struct Metered {
        inner: Cursor<Vec<u8>>,
        pulled: Rc<Cell<usize>>,
    }

    impl Read for Metered {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.pulled.set(self.pulled.get() + n);
            Ok(n)
        }
    }

    #[test]
    fn test_unterminated_input_read_incrementally() {
        let text = String::from_utf8(write_to_vec(&ppd_file()).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let count = 20_000;
        let mut input = String::new();
        input.push_str(lines[0]);
        input.push_str(lines[1]);
        for _ in 0..count {
            input.push_str(lines[2]);
        }
        input.push_str(lines[4]);
        input.push_str(lines[5]);
        let total = input.len();

        let pulled = Rc::new(Cell::new(0));
        let reader = Metered { inner: Cursor::new(input.into_bytes()), pulled: pulled.clone() };
        let mut iter = EntryIterator::new(reader);
        assert!(iter.next().unwrap().is_ok());
        assert!(pulled.get() <= 64 * 1024, "pulled {} of {total} bytes", pulled.get());

        let rest = iter.by_ref().filter(Result::is_ok).count();
        assert_eq!(rest + 1, count);
        assert_eq!(pulled.get(), total);
    }

    #[test]
    fn test_stops_after_error() {
        let text = String::from_utf8(write_to_vec(&ppd_file()).unwrap()).unwrap();
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        lines[2].truncate(50);
        let mut iter = EntryIterator::new(Cursor::new(lines.join("\n")));
        assert!(matches!(iter.next(), Some(Err(Error::Record(RecordError { line: 3, .. })))));
        assert!(iter.next().is_none());
    }
}
