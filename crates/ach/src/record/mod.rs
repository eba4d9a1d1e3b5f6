//! Typed representations of every NACHA line kind.
//!
//! Each record decodes from and encodes to one 94-byte line through
//! [`FixedWidthRecord`]; `parse` and `to_line` are exact inverses for any
//! value that passes validation.

mod addenda;
mod adv;
mod batch_control;
mod batch_header;
pub mod codes;
mod entry;
mod file_control;
mod file_header;
pub(crate) mod iat;

use std::fmt;

pub use addenda::{
    Addenda, Addenda02, Addenda05, Addenda10, Addenda11, Addenda12, Addenda13, Addenda14,
    Addenda15, Addenda16, Addenda17, Addenda18, Addenda98, Addenda98Refused, Addenda99,
    Addenda99Contested, Addenda99Dishonored, AddendaRecord, AddendaTag,
};
pub use adv::AdvEntryDetail;
pub use batch_control::{AdvBatchControl, BatchControl};
pub use batch_header::BatchHeader;
pub use codes::Direction;
pub use entry::{Category, EntryDetail};
pub use file_control::{AdvFileControl, FileControl};
pub use file_header::FileHeader;
pub use iat::{IAT_SEC_CODE, IatBatchHeader, IatEntryDetail, MAX_ADDENDA17, MAX_ADDENDA18};

use crate::{codec::FieldCursor, error::FieldError};

/// Number of lines in one physical block.
pub const BLOCKING_FACTOR: usize = 10;

/// Record type code, the first byte of every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    FileHeader,
    BatchHeader,
    EntryDetail,
    Addenda,
    BatchControl,
    FileControl,
}

impl RecordType {
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::FileHeader => '1',
            Self::BatchHeader => '5',
            Self::EntryDetail => '6',
            Self::Addenda => '7',
            Self::BatchControl => '8',
            Self::FileControl => '9',
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'1' => Some(Self::FileHeader),
            b'5' => Some(Self::BatchHeader),
            b'6' => Some(Self::EntryDetail),
            b'7' => Some(Self::Addenda),
            b'8' => Some(Self::BatchControl),
            b'9' => Some(Self::FileControl),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileHeader => "file header",
            Self::BatchHeader => "batch header",
            Self::EntryDetail => "entry detail",
            Self::Addenda => "addenda",
            Self::BatchControl => "batch control",
            Self::FileControl => "file control",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that maps onto one fixed-width line.
pub trait FixedWidthRecord {
    /// Decodes the fields following the record type code.
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError>
    where
        Self: Sized;

    /// Encodes the record as a 94-character line (without line terminator).
    fn to_line(&self) -> String;

    /// Decodes one 94-byte line.
    fn parse(line: &str) -> Result<Self, FieldError>
    where
        Self: Sized,
    {
        Self::parse_with(line, false)
    }

    /// Decodes one line, optionally keeping padding spaces of alphanumeric fields.
    fn parse_with(line: &str, preserve_spaces: bool) -> Result<Self, FieldError>
    where
        Self: Sized,
    {
        let mut cursor = FieldCursor::new(line)?.preserve_spaces(preserve_spaces);
        Self::decode(&mut cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_codes_roundtrip() {
        for ty in [
            RecordType::FileHeader,
            RecordType::BatchHeader,
            RecordType::EntryDetail,
            RecordType::Addenda,
            RecordType::BatchControl,
            RecordType::FileControl,
        ] {
            assert_eq!(RecordType::from_code(ty.code() as u8), Some(ty));
        }
        assert_eq!(RecordType::from_code(b'2'), None);
    }
}
