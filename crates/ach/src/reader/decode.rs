//! Line classification and addenda attachment, shared by [`Reader`] and
//! [`EntryIterator`].
//!
//! [`Reader`]: super::Reader
//! [`EntryIterator`]: super::EntryIterator

use crate::{
    batch::Batch,
    error::{RecordErrorKind, Result as EngineResult},
    file::File,
    iat_batch::IatBatch,
    opts::ValidateOpts,
    record::{
        Addenda, AdvBatchControl, AdvEntryDetail, AdvFileControl, BatchControl, BatchHeader,
        EntryDetail, FileControl, FixedWidthRecord, IAT_SEC_CODE, IatBatchHeader, IatEntryDetail,
        RecordType,
    },
    rules::SecCode,
};

pub(crate) type Result<T> = std::result::Result<T, RecordErrorKind>;

/// Standard Entry Class Code columns (51-53) of both batch header layouts.
const SEC_COLUMNS: std::ops::Range<usize> = 50..53;

pub(crate) fn record_type(line: &str) -> Result<RecordType> {
    let code = line.as_bytes().first().copied().unwrap_or(b' ');
    RecordType::from_code(code).ok_or(RecordErrorKind::UnknownType(char::from(code)))
}

/// The File Header comes first and only once. Returns `true` when the first
/// record is something else; a header after the first record is an error.
pub(crate) fn missing_file_header(started: bool, record: RecordType) -> Result<bool> {
    match (started, record) {
        (false, RecordType::FileHeader) => Ok(false),
        (false, _) => Ok(true),
        (true, RecordType::FileHeader) => {
            Err(RecordErrorKind::Unexpected { record, context: "after the first record" })
        }
        (true, _) => Ok(false),
    }
}

pub(crate) fn parse<T: FixedWidthRecord>(line: &str, opts: &ValidateOpts) -> Result<T> {
    Ok(T::parse_with(line, opts.preserve_spaces)?)
}

/// SEC code of a batch header line, without decoding the rest.
pub(crate) fn sec_code(line: &str) -> &str {
    line.get(SEC_COLUMNS).unwrap_or("").trim()
}

pub(crate) fn resolve_sec(code: &str) -> Result<SecCode> {
    code.parse().map_err(|_| RecordErrorKind::UnknownSec(code.to_string()))
}

/// Attaches an addenda line to a standard entry of a `sec` batch.
pub(crate) fn attach(entry: &mut EntryDetail, sec: SecCode, addenda: Addenda) -> Result<()> {
    let tag = addenda.tag();
    if !sec.rules().allows(tag) {
        return Err(RecordErrorKind::AddendaNotAllowed { sec, addenda: tag });
    }
    entry.add_addenda(addenda).map_err(|addenda| RecordErrorKind::AddendaOrder { addenda })
}

fn attach_iat(entry: &mut IatEntryDetail, addenda: Addenda) -> Result<()> {
    let tag = addenda.tag();
    if !SecCode::Iat.rules().allows(tag) {
        return Err(RecordErrorKind::AddendaNotAllowed { sec: SecCode::Iat, addenda: tag });
    }
    entry.add_addenda(addenda).map_err(|addenda| RecordErrorKind::AddendaOrder { addenda })
}

/// A batch between its header and control records.
pub(crate) enum OpenBatch {
    Standard(Batch),
    Iat(IatBatch),
}

impl OpenBatch {
    pub(crate) fn open(line: &str, opts: &ValidateOpts) -> Result<Self> {
        let code = sec_code(line);
        if code == IAT_SEC_CODE {
            let header: IatBatchHeader = parse(line, opts)?;
            let batch = IatBatch::new(header)
                .map_err(|_| RecordErrorKind::UnknownSec(code.to_string()))?;
            return Ok(Self::Iat(batch.with_validation(*opts)));
        }
        resolve_sec(code)?;
        let header: BatchHeader = parse(line, opts)?;
        let batch =
            Batch::new(header).map_err(|_| RecordErrorKind::UnknownSec(code.to_string()))?;
        Ok(Self::Standard(batch.with_validation(*opts)))
    }

    pub(crate) fn push_entry(&mut self, line: &str, opts: &ValidateOpts) -> Result<()> {
        let unexpected = |_| RecordErrorKind::Unexpected {
            record: RecordType::EntryDetail,
            context: "of the wrong kind for its batch",
        };
        match self {
            Self::Standard(batch) if batch.is_adv() => {
                batch.add_adv_entry(parse::<AdvEntryDetail>(line, opts)?).map_err(unexpected)
            }
            Self::Standard(batch) => {
                batch.add_entry(parse::<EntryDetail>(line, opts)?).map_err(unexpected)
            }
            Self::Iat(batch) => {
                batch.add_entry(parse(line, opts)?);
                Ok(())
            }
        }
    }

    pub(crate) fn push_addenda(&mut self, line: &str, opts: &ValidateOpts) -> Result<()> {
        let addenda = Addenda::parse_with(line, opts.preserve_spaces)?;
        match self {
            Self::Standard(batch) if batch.is_adv() => Err(RecordErrorKind::AddendaNotAllowed {
                sec: SecCode::Adv,
                addenda: addenda.tag(),
            }),
            Self::Standard(batch) => {
                let sec = batch.sec_code();
                let entry = batch.entries_mut().last_mut().ok_or(RecordErrorKind::OrphanAddenda)?;
                attach(entry, sec, addenda)
            }
            Self::Iat(batch) => {
                let entry = batch.entries_mut().last_mut().ok_or(RecordErrorKind::OrphanAddenda)?;
                attach_iat(entry, addenda)
            }
        }
    }

    /// Decodes the control line and hands the finished batch to `file`.
    pub(crate) fn close(self, line: &str, opts: &ValidateOpts, file: &mut File) -> Result<()> {
        let kind_mismatch = |_| RecordErrorKind::Unexpected {
            record: RecordType::BatchControl,
            context: "of the wrong kind for its batch",
        };
        match self {
            Self::Standard(mut batch) => {
                let placed = if batch.is_adv() {
                    batch.set_adv_batch_control(parse::<AdvBatchControl>(line, opts)?)
                } else {
                    batch.set_batch_control(parse::<BatchControl>(line, opts)?)
                };
                placed.map_err(kind_mismatch)?;
                file.add_batch(batch);
            }
            Self::Iat(mut batch) => {
                batch.set_batch_control(parse(line, opts)?);
                file.add_iat_batch(batch);
            }
        }
        Ok(())
    }
}

/// Decodes the File Control line matching the batches read so far.
pub(crate) fn close_file(line: &str, opts: &ValidateOpts, file: &mut File) -> Result<()> {
    if file.is_adv() {
        file.adv_file_control = Some(parse::<AdvFileControl>(line, opts)?);
    } else {
        file.file_control = parse::<FileControl>(line, opts)?;
    }
    Ok(())
}

/// Lifts a line-level error into the engine error.
pub(crate) fn at_line<T>(line: usize, result: Result<T>) -> EngineResult<T> {
    result.map_err(|kind| crate::error::RecordError::new(line, kind).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{FieldError, FieldErrorKind},
        record::{Addenda05, Addenda98, AddendaTag},
    };

    #[test]
    fn test_record_type() {
        assert_eq!(record_type("5200"), Ok(RecordType::BatchHeader));
        assert_eq!(record_type("X"), Err(RecordErrorKind::UnknownType('X')));
        assert_eq!(record_type(""), Err(RecordErrorKind::UnknownType(' ')));
    }

    #[test]
    fn test_attach_respects_rules() {
        let mut entry = EntryDetail::default();
        assert!(attach(&mut entry, SecCode::Ppd, Addenda::Addenda05(Addenda05::new("x"))).is_ok());

        let err = attach(&mut entry, SecCode::Ppd, Addenda::Addenda98(Addenda98::default()));
        assert_eq!(
            err,
            Err(RecordErrorKind::AddendaNotAllowed {
                sec: SecCode::Ppd,
                addenda: AddendaTag::Addenda98
            })
        );
        let mut entry = EntryDetail::default();
        assert!(attach(&mut entry, SecCode::Cor, Addenda::Addenda98(Addenda98::default())).is_ok());
        let again = attach(&mut entry, SecCode::Cor, Addenda::Addenda98(Addenda98::default()));
        assert_eq!(again, Err(RecordErrorKind::AddendaOrder { addenda: AddendaTag::Addenda98 }));
    }

    #[test]
    fn test_unknown_sec_line() {
        let line = format!("{:<50}XYZ{:<41}", "5200", "");
        assert_eq!(line.len(), 94);
        let err = OpenBatch::open(&line, &ValidateOpts::default()).err();
        assert_eq!(err, Some(RecordErrorKind::UnknownSec("XYZ".to_string())));
    }

    #[test]
    fn test_field_error_keeps_field() {
        let line = format!("6{}", "X".repeat(93));
        let err = parse::<EntryDetail>(&line, &ValidateOpts::default()).unwrap_err();
        assert!(matches!(
            err,
            RecordErrorKind::Field(FieldError { kind: FieldErrorKind::NonNumeric, .. })
        ));
    }
}
