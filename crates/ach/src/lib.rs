//! Reading, validating, building and writing NACHA ACH files.
//!
//! An ACH file is a sequence of fixed-width 94-byte lines: a File Header,
//! batches (Batch Header, Entry Details with their Addenda, Batch Control)
//! and a File Control, padded with `9` filler lines to blocks of ten. This
//! crate models that hierarchy as [`File`] → [`Batch`]/[`IatBatch`] →
//! [`EntryDetail`] and provides:
//!
//! - [`Reader`] and [`EntryIterator`] to decode files, whole or entry by entry
//! - `create()` and `validate()` on files and batches, governed by the
//!   per-SEC rules in [`rules`] and relaxed through [`ValidateOpts`]
//! - [`Writer`] to encode them back
//! - [`segment_file`] and [`merge_files`] for whole-file transformations
//! - JSON interchange through [`File::from_json`] and [`File::to_json`]
//!
//! # Quick start
//!
//! ```
//! use ach::{Batch, BatchHeader, EntryDetail, File, FileHeader, record::codes};
//!
//! let mut batch = Batch::new(BatchHeader {
//!     service_class_code: codes::CREDITS_ONLY,
//!     company_name: "Payroll Inc".to_string(),
//!     company_identification: "121042882".to_string(),
//!     standard_entry_class_code: "PPD".to_string(),
//!     company_entry_description: "PAYROLL".to_string(),
//!     effective_entry_date: "190816".to_string(),
//!     odfi_identification: "12104288".to_string(),
//!     ..BatchHeader::default()
//! })?;
//! batch.add_entry(EntryDetail {
//!     individual_name: "Jane Doe".to_string(),
//!     ..EntryDetail::new(codes::CHECKING_CREDIT, "231380104", "12345678", 100_000)
//! })?;
//! batch.create()?;
//!
//! let mut file = File::new(FileHeader::new("231380104", "121042882"));
//! file.add_batch(batch);
//! file.create()?;
//!
//! let bytes = ach::write_to_vec(&file)?;
//! let back = ach::read(bytes.as_slice())?;
//! assert_eq!(back.batches[0].entries()[0].amount, 100_000);
//! # Ok::<(), ach::Error>(())
//! ```

pub mod codec;
pub mod error;
pub mod ops;
pub mod record;
pub mod rules;

mod batch;
mod file;
mod iat_batch;
mod json;
mod opts;
mod reader;
mod writer;

use std::io::{Read, Write};

pub use batch::{Batch, BatchBody, ControlTotals, ENTRY_HASH_MODULUS};
pub use error::{ConsistencyError, Error, FieldError, RecordError, Result};
pub use file::File;
pub use iat_batch::IatBatch;
pub use json::{from_json, to_json, to_json_pretty};
pub use ops::{MergeOpts, Merged, Placement, SegmentConfig, merge_files, segment_file};
pub use opts::ValidateOpts;
pub use reader::{EntryIterator, Reader};
pub use record::{
    Addenda, AdvEntryDetail, BatchHeader, Category, EntryDetail, FileHeader, IatBatchHeader,
    IatEntryDetail,
};
pub use rules::SecCode;
pub use writer::{LineEnding, Writer, write_to_vec};

/// Reads one file from `reader` with default validation options.
///
/// Aggregates are not checked; call [`File::validate`] on the result.
pub fn read<R: Read>(reader: R) -> Result<File> {
    Reader::new(reader).read()
}

/// Reads one file with explicit validation options.
pub fn read_with<R: Read>(reader: R, opts: ValidateOpts) -> Result<File> {
    Reader::new(reader).with_validation(opts).read()
}

/// Writes `file` to `writer` with LF line endings.
pub fn write<W: Write>(writer: W, file: &File) -> Result<()> {
    Writer::new(writer).write(file)
}

/// Everything needed to build and process files.
pub mod prelude {
    pub use crate::{
        Batch, BatchHeader, EntryDetail, EntryIterator, Error, File, FileHeader, IatBatch,
        Reader, Result, SecCode, ValidateOpts, Writer, record::codes,
    };
}
