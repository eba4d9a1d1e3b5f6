use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    batch::Batch,
    error::{ConsistencyError, Error, Result},
    file::File,
    iat_batch::IatBatch,
    opts::ValidateOpts,
    record::{
        AdvEntryDetail, EntryDetail, IatEntryDetail,
        codes::{self, Direction},
    },
};

/// How derived batches are built from the original ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentConfig {
    /// Rewrite the service class code of derived batches to `220` (credits)
    /// and `225` (debits). ADV batches keep `280`.
    pub substitute_service_class: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self { substitute_service_class: true }
    }
}

/// Splits `file` into a credit-only and a debit-only file.
///
/// Every batch is partitioned by the direction of its entries' transaction
/// codes; batches with no entries of one direction are left out of that
/// file. Both outputs are created and validated. A side with no batches at
/// all comes back empty, with `allow_zero_batches` set in its options.
///
/// Entries whose transaction code has no direction fail with
/// [`ConsistencyError::AmbiguousDirection`].
pub fn segment_file(file: &File, config: &SegmentConfig) -> Result<(File, File)> {
    let mut credits = File::new(file.file_header.clone()).with_validation(*file.validation());
    let mut debits = File::new(file.file_header.clone()).with_validation(*file.validation());

    for (i, batch) in file.batches.iter().enumerate() {
        let (credit, debit) =
            split_batch(batch, config).map_err(|e| e.prefixed(&format!("batches[{i}]")))?;
        if let Some(batch) = credit {
            credits.add_batch(batch);
        }
        if let Some(batch) = debit {
            debits.add_batch(batch);
        }
    }
    for (i, batch) in file.iat_batches.iter().enumerate() {
        let (credit, debit) =
            split_iat_batch(batch, config).map_err(|e| e.prefixed(&format!("IATBatches[{i}]")))?;
        if let Some(batch) = credit {
            credits.add_iat_batch(batch);
        }
        if let Some(batch) = debit {
            debits.add_iat_batch(batch);
        }
    }

    finish(&mut credits)?;
    finish(&mut debits)?;
    debug!(
        credit_batches = credits.batch_count(),
        debit_batches = debits.batch_count(),
        "file segmented"
    );
    Ok((credits, debits))
}

fn finish(file: &mut File) -> Result<()> {
    if file.batch_count() == 0 {
        let opts = ValidateOpts { allow_zero_batches: true, ..*file.validation() };
        file.set_validation(opts);
    }
    file.create()
}

/// Partitions `items` by direction, cloning them into two lists.
fn partition<T: Clone>(
    items: &[T],
    list: &str,
    code_of: impl Fn(&T) -> u8,
) -> Result<(Vec<T>, Vec<T>)> {
    let mut credits = Vec::new();
    let mut debits = Vec::new();
    for (j, item) in items.iter().enumerate() {
        let code = code_of(item);
        match codes::direction(code) {
            Some(Direction::Credit) => credits.push(item.clone()),
            Some(Direction::Debit) => debits.push(item.clone()),
            None => {
                return Err(Error::consistency(
                    format!("{list}[{j}]"),
                    ConsistencyError::AmbiguousDirection(code),
                ));
            }
        }
    }
    Ok((credits, debits))
}

fn split_batch(batch: &Batch, config: &SegmentConfig) -> Result<(Option<Batch>, Option<Batch>)> {
    if batch.is_adv() {
        let (credits, debits) =
            partition(batch.adv_entries(), "advEntries", |e: &AdvEntryDetail| e.transaction_code)?;
        return Ok((derive_adv(batch, credits)?, derive_adv(batch, debits)?));
    }
    let (credits, debits) =
        partition(batch.entries(), "entries", |e: &EntryDetail| e.transaction_code)?;
    let substitute = config.substitute_service_class;
    Ok((
        derive(batch, credits, substitute.then_some(codes::CREDITS_ONLY))?,
        derive(batch, debits, substitute.then_some(codes::DEBITS_ONLY))?,
    ))
}

/// Copy of `batch` holding `entries`, `None` when there are none.
fn derive(
    batch: &Batch,
    entries: Vec<EntryDetail>,
    service_class: Option<u16>,
) -> Result<Option<Batch>> {
    if entries.is_empty() {
        return Ok(None);
    }
    let mut header = batch.header().clone();
    if let Some(code) = service_class {
        header.service_class_code = code;
    }
    let mut derived = Batch::new(header)?.with_validation(*batch.validation());
    derived.id = batch.id.clone();
    for entry in entries {
        derived.add_entry(entry)?;
    }
    derived.create()?;
    Ok(Some(derived))
}

fn derive_adv(batch: &Batch, entries: Vec<AdvEntryDetail>) -> Result<Option<Batch>> {
    if entries.is_empty() {
        return Ok(None);
    }
    let mut derived = Batch::new(batch.header().clone())?.with_validation(*batch.validation());
    derived.id = batch.id.clone();
    for entry in entries {
        derived.add_adv_entry(entry)?;
    }
    derived.create()?;
    Ok(Some(derived))
}

fn split_iat_batch(
    batch: &IatBatch,
    config: &SegmentConfig,
) -> Result<(Option<IatBatch>, Option<IatBatch>)> {
    let (credits, debits) =
        partition(batch.entries(), "IATEntryDetails", |e: &IatEntryDetail| e.transaction_code)?;
    let derive = |entries: Vec<IatEntryDetail>, code: u16| -> Result<Option<IatBatch>> {
        if entries.is_empty() {
            return Ok(None);
        }
        let mut header = batch.header().clone();
        if config.substitute_service_class {
            header.service_class_code = code;
        }
        let mut derived = IatBatch::new(header)?.with_validation(*batch.validation());
        derived.id = batch.id.clone();
        for entry in entries {
            derived.add_entry(entry);
        }
        derived.create()?;
        Ok(Some(derived))
    };
    Ok((derive(credits, codes::CREDITS_ONLY)?, derive(debits, codes::DEBITS_ONLY)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        batch::tests::{adv_batch, credit, debit, ppd_batch},
        file::tests::{file_header, ppd_file},
        iat_batch::tests::iat_batch,
    };

    #[test]
    fn test_mixed_file() {
        let file = ppd_file();
        let (credits, debits) = segment_file(&file, &SegmentConfig::default()).unwrap();

        assert_eq!(credits.batches.len(), 1);
        assert_eq!(credits.batches[0].header().service_class_code, codes::CREDITS_ONLY);
        assert_eq!(credits.batches[0].entries()[0].amount, 100_000_000);
        assert_eq!(credits.file_control.total_credit_entry_dollar_amount_in_file, 100_000_000);
        assert_eq!(credits.file_control.total_debit_entry_dollar_amount_in_file, 0);

        assert_eq!(debits.batches[0].header().service_class_code, codes::DEBITS_ONLY);
        assert_eq!(debits.batches[0].entries()[0].amount, 50_000);
        assert_eq!(debits.file_control.entry_hash, 7_640_125);

        assert!(credits.validate().is_ok());
        assert!(debits.validate().is_ok());
    }

    #[test]
    fn test_entries_partitioned() {
        let mut file = File::new(file_header());
        let entries = vec![credit(1), debit(2), credit(3), debit(4), credit(5)];
        file.add_batch(ppd_batch(entries));
        let mut second = ppd_batch(vec![debit(6)]);
        second.set_batch_number(2);
        second.create().unwrap();
        file.add_batch(second);
        file.create().unwrap();

        let (credits, debits) = segment_file(&file, &SegmentConfig::default()).unwrap();
        let amounts = |f: &File| -> Vec<u64> {
            f.batches.iter().flat_map(|b| b.entries().iter().map(|e| e.amount)).collect()
        };
        assert_eq!(amounts(&credits), [1, 3, 5]);
        assert_eq!(amounts(&debits), [2, 4, 6]);
        assert_eq!(credits.batches.len(), 1);
        assert_eq!(debits.batches.len(), 2);
        assert_eq!(debits.batches[1].header().batch_number, 2);
    }

    #[test]
    fn test_traces_preserved() {
        let (credits, debits) = segment_file(&ppd_file(), &SegmentConfig::default()).unwrap();
        assert_eq!(credits.batches[0].entries()[0].trace_number, "121042880000001");
        assert_eq!(debits.batches[0].entries()[0].trace_number, "121042880000002");
        assert!(debits.validate().is_ok());
    }

    #[test]
    fn test_keep_service_class() {
        let config = SegmentConfig { substitute_service_class: false };
        let (credits, _) = segment_file(&ppd_file(), &config).unwrap();
        assert_eq!(
            credits.batches[0].header().service_class_code,
            codes::MIXED_DEBITS_AND_CREDITS
        );
    }

    #[test]
    fn test_single_direction_leaves_empty_side() {
        let mut file = File::new(file_header());
        file.add_batch(ppd_batch(vec![credit(10)]));
        file.create().unwrap();

        let (credits, debits) = segment_file(&file, &SegmentConfig::default()).unwrap();
        assert_eq!(credits.batch_count(), 1);
        assert_eq!(debits.batch_count(), 0);
        assert!(debits.validation().allow_zero_batches);
        assert_eq!(debits.file_control.batch_count, 0);
    }

    #[test]
    fn test_ambiguous_direction() {
        let mut file = ppd_file();
        file.batches[0].entries_mut()[1].transaction_code = 25;
        let err = segment_file(&file, &SegmentConfig::default()).unwrap_err();
        assert_eq!(err.path(), Some("batches[0].entries[1]"));
        assert!(matches!(
            err,
            Error::Consistency { error: ConsistencyError::AmbiguousDirection(25), .. }
        ));
    }

    #[test]
    fn test_adv_batch() {
        let mut batch = adv_batch();
        batch.create().unwrap();
        let mut file = File::new(file_header());
        file.add_batch(batch);
        file.create().unwrap();

        let (credits, debits) = segment_file(&file, &SegmentConfig::default()).unwrap();
        assert_eq!(credits.batches[0].adv_entries().len(), 1);
        assert_eq!(
            credits.batches[0].header().service_class_code,
            codes::AUTOMATED_ACCOUNTING_ADVICES
        );
        assert!(credits.adv_file_control.is_some());
        assert_eq!(debits.batch_count(), 0);
    }

    #[test]
    fn test_iat_batch() {
        let mut file = File::new(file_header());
        file.add_iat_batch(iat_batch());
        file.create().unwrap();

        let (credits, debits) = segment_file(&file, &SegmentConfig::default()).unwrap();
        assert_eq!(credits.iat_batches.len(), 1);
        assert_eq!(credits.iat_batches[0].header().service_class_code, codes::CREDITS_ONLY);
        assert_eq!(credits.file_control.entry_addenda_count, 8);
        assert!(debits.iat_batches.is_empty());
    }
}
