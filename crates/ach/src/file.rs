//! The root aggregate: File Header, batches, IAT batches and File Control.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    batch::{Batch, ControlTotals, narrow_count},
    error::{ConsistencyError, Error, Result},
    iat_batch::IatBatch,
    opts::ValidateOpts,
    record::{AdvFileControl, BLOCKING_FACTOR, Category, FileControl, FileHeader},
};

const FILE_TOTAL_FIELDS: [&str; 4] = [
    "entryAddendaCount",
    "entryHash",
    "totalDebitEntryDollarAmountInFile",
    "totalCreditEntryDollarAmountInFile",
];

/// A complete ACH file.
///
/// Files built in memory are finished with [`File::create`], which folds
/// the batch controls into the File Control record. Files read from bytes
/// keep the control records exactly as read; [`File::validate`] reports any
/// disagreement.
///
/// # Example
///
/// ```
/// use ach::{File, FileHeader};
///
/// let mut file = File::new(FileHeader::new("231380104", "121042882"));
/// assert!(file.create().is_err()); // no batches yet
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct File {
    /// Opaque identifier for callers; never written to the file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub file_header: FileHeader,
    pub batches: Vec<Batch>,
    #[serde(rename = "IATBatches", skip_serializing_if = "Vec::is_empty")]
    pub iat_batches: Vec<IatBatch>,
    pub file_control: FileControl,
    /// Present instead of the regular control in files of ADV batches.
    #[serde(rename = "fileADVControl", skip_serializing_if = "Option::is_none")]
    pub adv_file_control: Option<AdvFileControl>,
    #[serde(rename = "validateOpts", skip_serializing_if = "ValidateOpts::is_strict")]
    opts: ValidateOpts,
}

impl File {
    #[must_use]
    pub fn new(file_header: FileHeader) -> Self {
        Self { file_header, ..Self::default() }
    }

    #[must_use]
    pub fn with_validation(mut self, opts: ValidateOpts) -> Self {
        self.set_validation(opts);
        self
    }

    /// Sets the options of the file and of every batch it holds.
    pub fn set_validation(&mut self, opts: ValidateOpts) {
        self.opts = opts;
        for batch in &mut self.batches {
            batch.set_validation(opts);
        }
        for batch in &mut self.iat_batches {
            batch.set_validation(opts);
        }
    }

    #[must_use]
    pub fn validation(&self) -> &ValidateOpts {
        &self.opts
    }

    /// Appends a batch; it inherits the options of the file.
    pub fn add_batch(&mut self, mut batch: Batch) {
        batch.set_validation(self.opts);
        self.batches.push(batch);
    }

    pub fn add_iat_batch(&mut self, mut batch: IatBatch) {
        batch.set_validation(self.opts);
        self.iat_batches.push(batch);
    }

    /// `true` when the file holds ADV batches (and therefore an ADV File Control).
    #[must_use]
    pub fn is_adv(&self) -> bool {
        self.batches.iter().any(Batch::is_adv)
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.len() + self.iat_batches.len()
    }

    /// Records of the file, padding excluded.
    #[must_use]
    pub fn line_count(&self) -> usize {
        2 + self.batches.iter().map(Batch::line_count).sum::<usize>()
            + self.iat_batches.iter().map(IatBatch::line_count).sum::<usize>()
    }

    /// Number of 10-line blocks the written file occupies.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.line_count().div_ceil(BLOCKING_FACTOR)
    }

    /// Fold of the totals recorded in the batch controls.
    #[must_use]
    pub fn batch_totals(&self) -> ControlTotals {
        let mut totals = ControlTotals::default();
        for batch in &self.batches {
            totals.add_batch(&batch.totals());
        }
        for batch in &self.iat_batches {
            totals.add_batch(&batch.totals());
        }
        totals
    }

    /// Totals as recorded in the file control record in use.
    #[must_use]
    pub fn totals(&self) -> ControlTotals {
        match &self.adv_file_control {
            Some(control) => ControlTotals {
                entry_addenda_count: control.entry_addenda_count.into(),
                entry_hash: control.entry_hash,
                total_debit: control.total_debit_entry_dollar_amount_in_file,
                total_credit: control.total_credit_entry_dollar_amount_in_file,
            },
            None => ControlTotals {
                entry_addenda_count: self.file_control.entry_addenda_count.into(),
                entry_hash: self.file_control.entry_hash,
                total_debit: self.file_control.total_debit_entry_dollar_amount_in_file,
                total_credit: self.file_control.total_credit_entry_dollar_amount_in_file,
            },
        }
    }

    /// Batches that carry notifications of change.
    #[must_use]
    pub fn notifications_of_change(&self) -> Vec<&Batch> {
        self.batches.iter().filter(|b| b.category() == Category::Noc).collect()
    }

    /// Batches that carry returned entries.
    #[must_use]
    pub fn return_entries(&self) -> Vec<&Batch> {
        self.batches.iter().filter(|b| b.category() == Category::Return).collect()
    }

    /// Recomputes the File Control (or ADV File Control) from the batch
    /// controls and validates the file.
    ///
    /// Batches are expected to be created already; their controls are folded
    /// as they are.
    pub fn create(&mut self) -> Result<()> {
        if self.batch_count() == 0 && !self.opts.allow_zero_batches {
            return Err(Error::consistency("", ConsistencyError::NoBatches));
        }
        self.check_adv_mix()?;

        let totals = self.batch_totals();
        let batch_count = narrow_count(self.batch_count() as u64);
        let block_count = narrow_count(self.block_count() as u64);
        if self.is_adv() {
            self.adv_file_control = Some(AdvFileControl {
                batch_count,
                block_count,
                entry_addenda_count: narrow_count(totals.entry_addenda_count),
                entry_hash: totals.entry_hash,
                total_debit_entry_dollar_amount_in_file: totals.total_debit,
                total_credit_entry_dollar_amount_in_file: totals.total_credit,
            });
            self.file_control = FileControl::default();
        } else {
            self.adv_file_control = None;
            self.file_control = FileControl {
                batch_count,
                block_count,
                entry_addenda_count: narrow_count(totals.entry_addenda_count),
                entry_hash: totals.entry_hash,
                total_debit_entry_dollar_amount_in_file: totals.total_debit,
                total_credit_entry_dollar_amount_in_file: totals.total_credit,
            };
        }
        debug!(batches = batch_count, blocks = block_count, "file created");
        self.validate()
    }

    fn check_adv_mix(&self) -> Result<()> {
        let adv = self.batches.iter().filter(|b| b.is_adv()).count();
        if adv > 0 && (adv < self.batches.len() || !self.iat_batches.is_empty()) {
            return Err(Error::consistency("", ConsistencyError::MixedAdv));
        }
        Ok(())
    }

    /// Validates with the options carried by the file.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&self.opts)
    }

    /// Structural and consistency checks of the whole file. Never mutates.
    pub fn validate_with(&self, opts: &ValidateOpts) -> Result<()> {
        if opts.skip_all {
            return Ok(());
        }
        self.file_header.validate(opts).map_err(|e| Error::field("fileHeader", e))?;
        if self.batch_count() == 0 && !opts.allow_zero_batches {
            return Err(Error::consistency("", ConsistencyError::NoBatches));
        }
        self.check_adv_mix()?;

        for (i, batch) in self.batches.iter().enumerate() {
            batch.validate_with(opts).map_err(|e| e.prefixed(&format!("batches[{i}]")))?;
        }
        for (i, batch) in self.iat_batches.iter().enumerate() {
            batch.validate_with(opts).map_err(|e| e.prefixed(&format!("IATBatches[{i}]")))?;
        }
        if !opts.allow_unordered_batch_numbers {
            self.check_batch_numbers()?;
        }
        self.check_control(opts)
    }

    /// Standard and IAT batches are held in separate lists, so each list is
    /// checked against its own order.
    fn check_batch_numbers(&self) -> Result<()> {
        ascending(self.batches.iter().map(|b| b.header().batch_number), "batches")?;
        ascending(self.iat_batches.iter().map(|b| b.header().batch_number), "IATBatches")
    }

    fn check_control(&self, opts: &ValidateOpts) -> Result<()> {
        let (path, batch_count, block_count) = if self.is_adv() {
            let control = self.adv_file_control.as_ref().ok_or_else(|| {
                Error::consistency("", ConsistencyError::MissingAdvControl)
            })?;
            control.validate(opts).map_err(|e| Error::field("fileADVControl", e))?;
            ("fileADVControl", control.batch_count, control.block_count)
        } else {
            self.file_control.validate(opts).map_err(|e| Error::field("fileControl", e))?;
            ("fileControl", self.file_control.batch_count, self.file_control.block_count)
        };
        let counts = [
            ("batchCount", self.batch_count(), batch_count),
            ("blockCount", self.block_count(), block_count),
        ];
        for (field, expected, actual) in counts {
            if expected as u64 != u64::from(actual) {
                return Err(Error::consistency(
                    path,
                    ConsistencyError::Aggregate {
                        field,
                        expected: expected as u64,
                        actual: actual.into(),
                    },
                ));
            }
        }
        self.batch_totals()
            .check_recorded(&self.totals(), FILE_TOTAL_FIELDS)
            .map_err(|e| Error::consistency(path, e))
    }
}

fn ascending(numbers: impl Iterator<Item = u32>, list: &str) -> Result<()> {
    let mut previous: Option<u32> = None;
    for (i, number) in numbers.enumerate() {
        if let Some(previous) = previous
            && number <= previous
        {
            return Err(Error::consistency(
                format!("{list}[{i}]"),
                ConsistencyError::BatchNumberOrder { previous, number },
            ));
        }
        previous = Some(number);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        batch::tests::{credit, debit, ppd_batch},
        iat_batch::tests::iat_batch,
    };

    pub(crate) fn file_header() -> FileHeader {
        FileHeader {
            immediate_destination: "231380104".to_string(),
            immediate_origin: "121042882".to_string(),
            file_creation_date: "190816".to_string(),
            file_creation_time: "1055".to_string(),
            immediate_destination_name: "Citadel".to_string(),
            immediate_origin_name: "Wells Fargo".to_string(),
            ..FileHeader::default()
        }
    }

    /// Created file with one PPD batch of a credit and a debit.
    pub(crate) fn ppd_file() -> File {
        let mut file = File::new(file_header());
        file.add_batch(ppd_batch(vec![credit(100_000_000), debit(50_000)]));
        file.create().unwrap();
        file
    }

    #[test]
    fn test_create_folds_batches() {
        let mut file = File::new(file_header());
        let mut second = ppd_batch(vec![credit(7)]);
        second.set_batch_number(2);
        second.create().unwrap();
        file.add_batch(ppd_batch(vec![credit(100_000_000), debit(50_000)]));
        file.add_batch(second);
        file.create().unwrap();

        let control = &file.file_control;
        assert_eq!(control.batch_count, 2);
        assert_eq!(control.entry_addenda_count, 3);
        assert_eq!(control.entry_hash, 23_138_010 * 2 + 7_640_125);
        assert_eq!(control.total_credit_entry_dollar_amount_in_file, 100_000_007);
        assert_eq!(control.total_debit_entry_dollar_amount_in_file, 50_000);
        // 2 + (2 + 2) + (2 + 1) lines
        assert_eq!(control.block_count, 1);
        assert!(file.adv_file_control.is_none());
    }

    #[test]
    fn test_no_batches() {
        let mut file = File::new(file_header());
        let err = file.create().unwrap_err();
        assert!(matches!(err, Error::Consistency { error: ConsistencyError::NoBatches, .. }));

        let mut file = file.with_validation(ValidateOpts {
            allow_zero_batches: true,
            ..Default::default()
        });
        file.create().unwrap();
        assert_eq!(file.file_control.block_count, 1);
    }

    #[test]
    fn test_entry_addenda_count_mismatch() {
        let mut file = ppd_file();
        file.file_control.entry_addenda_count = 5;
        let err = file.validate().unwrap_err();
        assert_eq!(err.path(), Some("fileControl"));
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::Aggregate {
                    field: "entryAddendaCount",
                    expected: 2,
                    actual: 5,
                },
                ..
            }
        ));
    }

    #[test]
    fn test_batch_number_order() {
        let mut file = File::new(file_header());
        file.add_batch(ppd_batch(vec![credit(1)]));
        file.add_batch(ppd_batch(vec![credit(2)]));
        let err = file.create().unwrap_err();
        assert_eq!(err.path(), Some("batches[1]"));
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::BatchNumberOrder { previous: 1, number: 1 },
                ..
            }
        ));

        file.set_validation(ValidateOpts {
            allow_unordered_batch_numbers: true,
            ..Default::default()
        });
        assert!(file.create().is_ok());
    }

    #[test]
    fn test_batch_errors_are_prefixed() {
        let mut file = ppd_file();
        file.batches[0].entries_mut()[1].amount = 1;
        let err = file.validate().unwrap_err();
        assert_eq!(err.path(), Some("batches[0].batchControl"));
    }

    #[test]
    fn test_iat_batches_counted() {
        let mut file = File::new(file_header());
        file.add_batch(ppd_batch(vec![credit(5)]));
        let mut iat = iat_batch();
        iat.set_batch_number(2);
        iat.create().unwrap();
        file.add_iat_batch(iat);
        file.create().unwrap();
        assert_eq!(file.file_control.batch_count, 2);
        assert_eq!(file.file_control.entry_addenda_count, 1 + 8);
        // 2 + 3 + 10 lines
        assert_eq!(file.file_control.block_count, 2);
    }

    #[test]
    fn test_iat_batch_numbered_first() {
        let mut file = File::new(file_header());
        let mut ppd = ppd_batch(vec![credit(5)]);
        ppd.set_batch_number(2);
        ppd.create().unwrap();
        file.add_batch(ppd);
        file.add_iat_batch(iat_batch());
        file.create().unwrap();

        // IAT batch #1 placed ahead of PPD batch #2 in the text
        let bytes = crate::write_to_vec(&file).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let reordered: Vec<&str> =
            [&lines[..1], &lines[4..14], &lines[1..4], &lines[14..]].concat();
        let read = crate::read(reordered.join("\n").as_bytes()).unwrap();
        read.validate().unwrap();
        assert_eq!(read, file);

        let mut twice = file.clone();
        twice.add_iat_batch(iat_batch());
        let err = twice.create().unwrap_err();
        assert_eq!(err.path(), Some("IATBatches[1]"));
    }

    #[test]
    fn test_derived_views() {
        let file = ppd_file();
        assert!(file.notifications_of_change().is_empty());
        assert!(file.return_entries().is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let file = ppd_file();
        let json = serde_json::to_string(&file).unwrap();
        for name in ["fileHeader", "batches", "fileControl"] {
            assert!(json.contains(&format!("\"{name}\"")), "{name}");
        }
        assert!(!json.contains("IATBatches"));
        assert!(!json.contains("validateOpts"));
    }
}
