//! Error types of the ACH format engine.
//!
//! Three structured kinds mirror the layers of the engine:
//!
//! - [`FieldError`]: one fixed-width field fails its width, charset or code checks
//! - [`RecordError`]: a line cannot be classified or appears out of sequence
//! - [`ConsistencyError`]: records disagree with each other or with the SEC rules
//!
//! [`Error`] wraps them together with the path of the offending record
//! (e.g. `batches[2].entries[0].addenda05[1]`).

use std::{fmt, io};

use thiserror::Error;

use crate::{
    record::{AddendaTag, RecordType},
    rules::SecCode,
};

/// What exactly is wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The source slice is not exactly `expected` bytes wide.
    Width { expected: usize, actual: usize },
    /// The value does not fit into the field.
    TooLong { max: usize },
    /// A numeric field contains something other than ASCII digits.
    NonNumeric,
    /// An alphanumeric field contains characters outside printable ASCII.
    NonAlphanumeric,
    /// The routing number check digit does not match.
    CheckDigit { expected: u8 },
    /// Not a valid `YYMMDD` (or `MMDD`, `MMYY`) date.
    InvalidDate,
    /// Not a valid `HHmm` time.
    InvalidTime,
    /// The value is not one of the codes the field admits.
    InvalidCode,
    /// A mandatory field is blank or zero.
    Required,
    /// The value breaks a rule of the owning batch (limit, fixed literal).
    Invalid,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width { expected, actual } => {
                write!(f, "has width {actual}, expected {expected}")
            }
            Self::TooLong { max } => write!(f, "exceeds {max} characters"),
            Self::NonNumeric => write!(f, "is not numeric"),
            Self::NonAlphanumeric => write!(f, "has invalid characters"),
            Self::CheckDigit { expected } => {
                write!(f, "has invalid check digit, expected {expected}")
            }
            Self::InvalidDate => write!(f, "is not a valid date"),
            Self::InvalidTime => write!(f, "is not a valid time"),
            Self::InvalidCode => write!(f, "is not a valid code"),
            Self::Required => write!(f, "is mandatory"),
            Self::Invalid => write!(f, "is invalid"),
        }
    }
}

/// A single field failed decoding or validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {kind}: '{value}'")]
pub struct FieldError {
    /// Field name as used in JSON (`amount`, `rdfiIdentification`, ...).
    pub field: &'static str,
    /// Offending value, as seen in the source.
    pub value: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: &'static str, value: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self { field, value: value.into(), kind }
    }
}

/// Why a line was rejected by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordErrorKind {
    #[error("record is {0} bytes long, expected 94")]
    Length(usize),

    #[error("record contains non-ASCII bytes")]
    NonAscii,

    #[error("unknown record type '{0}'")]
    UnknownType(char),

    #[error("unexpected {record} record {context}")]
    Unexpected { record: RecordType, context: &'static str },

    #[error("file header record is missing")]
    MissingFileHeader,

    #[error("file control record is missing")]
    MissingFileControl,

    #[error("batch control record is missing")]
    MissingBatchControl,

    #[error("file contains no records")]
    Empty,

    #[error("addenda record without a preceding entry detail")]
    OrphanAddenda,

    #[error("{addenda} is not allowed in {sec} batches")]
    AddendaNotAllowed { sec: SecCode, addenda: AddendaTag },

    #[error("{addenda} is out of order or repeated")]
    AddendaOrder { addenda: AddendaTag },

    #[error("unknown standard entry class code '{0}'")]
    UnknownSec(String),

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// A structural error tied to a line of the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct RecordError {
    /// 1-based record number.
    pub line: usize,
    pub kind: RecordErrorKind,
}

impl RecordError {
    pub fn new(line: usize, kind: impl Into<RecordErrorKind>) -> Self {
        Self { line, kind: kind.into() }
    }
}

/// Cross-record disagreement found by `create()`/`validate()` or a file operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    // === Aggregates ===
    #[error("{field} is {actual}, calculated {expected}")]
    Aggregate { field: &'static str, expected: u64, actual: u64 },

    #[error("{field} differs between header ('{header}') and control ('{control}')")]
    HeaderControlMismatch { field: &'static str, header: String, control: String },

    // === Ordering ===
    #[error("batch number {number} does not follow {previous}")]
    BatchNumberOrder { previous: u32, number: u32 },

    #[error("trace number {trace} does not follow {previous}")]
    TraceNumberOrder { previous: String, trace: String },

    #[error("trace number {trace} does not start with ODFI identification {odfi}")]
    TracePrefix { trace: String, odfi: String },

    // === Addenda ===
    #[error("{addenda} is not allowed for {sec} entries")]
    AddendaNotAllowed { sec: SecCode, addenda: AddendaTag },

    #[error("{sec} entries require {addenda}")]
    AddendaRequired { sec: SecCode, addenda: AddendaTag },

    #[error("{sec} entries allow at most {max} {addenda} records, found {found}")]
    AddendaCardinality { sec: SecCode, addenda: AddendaTag, max: usize, found: usize },

    #[error("addenda record indicator is {indicator} but entry has {count} addenda")]
    AddendaIndicator { indicator: u8, count: usize },

    #[error("{field} is {actual}, expected {expected}")]
    AddendaSequence { field: &'static str, expected: u64, actual: u64 },

    #[error("entry carries both {first} and {second}")]
    ConflictingAddenda { first: AddendaTag, second: AddendaTag },

    // === Batch shape ===
    #[error("unknown standard entry class code '{0}'")]
    UnknownSec(String),

    #[error("batch is built for {expected} but its header says '{actual}'")]
    SecMismatch { expected: SecCode, actual: String },

    #[error("{sec} batch cannot hold this kind of entry")]
    WrongEntryKind { sec: SecCode },

    #[error("batch has no entries")]
    NoEntries,

    #[error("{field} does not belong in a {sec} batch")]
    MisplacedRecords { sec: SecCode, field: &'static str },

    #[error("transaction code {code} violates {rule}")]
    Direction { code: u8, rule: &'static str },

    #[error("batch mixes forward, return and notification of change entries")]
    MixedCategories,

    // === File shape ===
    #[error("file has no batches")]
    NoBatches,

    #[error("ADV batches cannot share a file with other batches")]
    MixedAdv,

    #[error("ADV file is missing its ADV file control")]
    MissingAdvControl,

    // === File operations ===
    #[error("direction of transaction code {0} is ambiguous")]
    AmbiguousDirection(u8),

    #[error("batch needs {needed} {limit}, merge limit is {max}")]
    MergeLimit { limit: &'static str, needed: u64, max: u64 },
}

/// Main error of the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{path}: {error}")]
    Field {
        path: String,
        #[source]
        error: FieldError,
    },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("{path}: {error}")]
    Consistency {
        path: String,
        #[source]
        error: ConsistencyError,
    },

    #[error("invalid JSON at '{path}': {message}")]
    Json { path: String, message: String },
}

impl Error {
    pub fn field(path: impl Into<String>, error: FieldError) -> Self {
        Self::Field { path: path.into(), error }
    }

    pub fn consistency(path: impl Into<String>, error: ConsistencyError) -> Self {
        Self::Consistency { path: path.into(), error }
    }

    /// Prepends `prefix` to the record path, so errors raised inside a batch
    /// end up addressed from the file root.
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        match self {
            Self::Field { path, error } => Self::Field { path: join(prefix, &path), error },
            Self::Consistency { path, error } => {
                Self::Consistency { path: join(prefix, &path), error }
            }
            Self::Json { path, message } => Self::Json { path: join(prefix, &path), message },
            other => other,
        }
    }

    /// Record path of the error, if it carries one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Field { path, .. } | Self::Consistency { path, .. } | Self::Json { path, .. } => {
                Some(path)
            }
            Self::Io(_) | Self::Record(_) => None,
        }
    }
}

fn join(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}.{path}"),
    }
}

/// Shorthand Result type of the engine.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("amount", "12a", FieldErrorKind::NonNumeric);
        assert_eq!(err.to_string(), "amount is not numeric: '12a'");
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::new(3, RecordErrorKind::Length(80));
        assert_eq!(err.to_string(), "line 3: record is 80 bytes long, expected 94");
    }

    #[test]
    fn test_prefixed_builds_paths() {
        let err = Error::field("addenda05[1]", FieldError::new("x", "", FieldErrorKind::Required))
            .prefixed("entries[0]")
            .prefixed("batches[2]");
        assert_eq!(err.path(), Some("batches[2].entries[0].addenda05[1]"));
    }

    #[test]
    fn test_prefixed_with_empty_path() {
        let err = Error::consistency("", ConsistencyError::NoEntries).prefixed("batches[0]");
        assert_eq!(err.path(), Some("batches[0]"));
        assert_eq!(err.to_string(), "batches[0]: batch has no entries");
    }

    #[test]
    fn test_record_errors_keep_no_path() {
        let err: Error = RecordError::new(1, RecordErrorKind::Empty).into();
        assert_eq!(err.prefixed("batches[0]").path(), None);
    }
}
