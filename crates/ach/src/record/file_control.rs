//! File Control record (`9`) and its ADV variant.

use serde::{Deserialize, Serialize};

use super::FixedWidthRecord;
use crate::{
    codec::{FieldCursor, LineBuilder, check_max},
    error::{FieldError, FieldErrorKind},
    opts::ValidateOpts,
};

/// Last record of a file: folds over every batch control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileControl {
    pub batch_count: u32,
    /// Number of 10-line blocks, filler lines included.
    pub block_count: u32,
    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit_entry_dollar_amount_in_file: u64,
    pub total_credit_entry_dollar_amount_in_file: u64,
}

impl FileControl {
    pub fn validate(&self, _opts: &ValidateOpts) -> Result<(), FieldError> {
        check_max("batchCount", self.batch_count.into(), 6)?;
        check_max("blockCount", self.block_count.into(), 6)?;
        check_max("entryAddendaCount", self.entry_addenda_count.into(), 8)?;
        check_max("entryHash", self.entry_hash, 10)?;
        check_max(
            "totalDebitEntryDollarAmountInFile",
            self.total_debit_entry_dollar_amount_in_file,
            12,
        )?;
        check_max(
            "totalCreditEntryDollarAmountInFile",
            self.total_credit_entry_dollar_amount_in_file,
            12,
        )
    }
}

impl FixedWidthRecord for FileControl {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        let control = Self {
            batch_count: narrow("batchCount", cursor.numeric("batchCount", 6)?)?,
            block_count: narrow("blockCount", cursor.numeric("blockCount", 6)?)?,
            entry_addenda_count: narrow(
                "entryAddendaCount",
                cursor.numeric("entryAddendaCount", 8)?,
            )?,
            entry_hash: cursor.numeric("entryHash", 10)?,
            total_debit_entry_dollar_amount_in_file: cursor
                .numeric("totalDebitEntryDollarAmountInFile", 12)?,
            total_credit_entry_dollar_amount_in_file: cursor
                .numeric("totalCreditEntryDollarAmountInFile", 12)?,
        };
        cursor.skip(39);
        Ok(control)
    }

    fn to_line(&self) -> String {
        LineBuilder::new('9')
            .numeric(self.batch_count.into(), 6)
            .numeric(self.block_count.into(), 6)
            .numeric(self.entry_addenda_count.into(), 8)
            .numeric(self.entry_hash, 10)
            .numeric(self.total_debit_entry_dollar_amount_in_file, 12)
            .numeric(self.total_credit_entry_dollar_amount_in_file, 12)
            .blank(39)
            .finish()
    }
}

/// File Control of ADV files, with 20-digit totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvFileControl {
    pub batch_count: u32,
    pub block_count: u32,
    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit_entry_dollar_amount_in_file: u64,
    pub total_credit_entry_dollar_amount_in_file: u64,
}

impl AdvFileControl {
    pub fn validate(&self, _opts: &ValidateOpts) -> Result<(), FieldError> {
        check_max("batchCount", self.batch_count.into(), 6)?;
        check_max("blockCount", self.block_count.into(), 6)?;
        check_max("entryAddendaCount", self.entry_addenda_count.into(), 8)?;
        check_max("entryHash", self.entry_hash, 10)
    }
}

impl FixedWidthRecord for AdvFileControl {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        let control = Self {
            batch_count: narrow("batchCount", cursor.numeric("batchCount", 6)?)?,
            block_count: narrow("blockCount", cursor.numeric("blockCount", 6)?)?,
            entry_addenda_count: narrow(
                "entryAddendaCount",
                cursor.numeric("entryAddendaCount", 8)?,
            )?,
            entry_hash: cursor.numeric("entryHash", 10)?,
            total_debit_entry_dollar_amount_in_file: cursor
                .numeric("totalDebitEntryDollarAmountInFile", 20)?,
            total_credit_entry_dollar_amount_in_file: cursor
                .numeric("totalCreditEntryDollarAmountInFile", 20)?,
        };
        cursor.skip(23);
        Ok(control)
    }

    fn to_line(&self) -> String {
        LineBuilder::new('9')
            .numeric(self.batch_count.into(), 6)
            .numeric(self.block_count.into(), 6)
            .numeric(self.entry_addenda_count.into(), 8)
            .numeric(self.entry_hash, 10)
            .numeric(self.total_debit_entry_dollar_amount_in_file, 20)
            .numeric(self.total_credit_entry_dollar_amount_in_file, 20)
            .blank(23)
            .finish()
    }
}

/// Narrows a decoded counter that is at most 8 digits wide.
pub(crate) fn narrow(field: &'static str, value: u64) -> Result<u32, FieldError> {
    u32::try_from(value)
        .map_err(|_| FieldError::new(field, value.to_string(), FieldErrorKind::TooLong { max: 9 }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileControl {
        FileControl {
            batch_count: 1,
            block_count: 1,
            entry_addenda_count: 2,
            entry_hash: 23138010,
            total_debit_entry_dollar_amount_in_file: 0,
            total_credit_entry_dollar_amount_in_file: 100_000_000,
        }
    }

    #[test]
    fn test_file_control_line() {
        let line = sample().to_line();
        assert_eq!(line.len(), 94);
        assert!(line.starts_with("9000001000001000000020023138010000000000000000100000000"));
        assert_eq!(FileControl::parse(&line).unwrap(), sample());
    }

    #[test]
    fn test_file_control_validation() {
        let opts = ValidateOpts::default();
        assert!(sample().validate(&opts).is_ok());
        let too_many = FileControl { block_count: 1_000_000, ..sample() };
        assert_eq!(too_many.validate(&opts).unwrap_err().field, "blockCount");
    }

    #[test]
    fn test_adv_file_control_roundtrip() {
        let control = AdvFileControl {
            batch_count: 1,
            block_count: 1,
            entry_addenda_count: 1,
            entry_hash: 23138010,
            total_debit_entry_dollar_amount_in_file: 12_345_678_901_234,
            total_credit_entry_dollar_amount_in_file: 0,
        };
        let line = control.to_line();
        assert_eq!(&line[31..51], "00000012345678901234");
        assert_eq!(AdvFileControl::parse(&line).unwrap(), control);
    }

    #[test]
    fn test_non_numeric_count() {
        let line = sample().to_line().replacen("000001", "00000X", 1);
        assert_eq!(FileControl::parse(&line).unwrap_err().field, "batchCount");
    }
}
