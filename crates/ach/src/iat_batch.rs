//! Batches of international (IAT) entries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    batch::{
        BATCH_TOTAL_FIELDS, ControlTotals, Envelope, assign_traces, check_envelope,
        check_service_class_direction, check_traces, narrow_count,
    },
    error::{ConsistencyError, Error, Result},
    opts::ValidateOpts,
    record::{
        AddendaTag, BatchControl, IatBatchHeader, IatEntryDetail, MAX_ADDENDA17, MAX_ADDENDA18,
    },
    rules::{RequiredAddenda, SecCode},
};

/// An IAT batch: IAT header, IAT entries with their addenda legs and a
/// regular Batch Control record.
///
/// The originator identification of the header plays the role of the
/// company identification in the control record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IatBatch {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "IATBatchHeader")]
    header: IatBatchHeader,
    #[serde(rename = "IATEntryDetails")]
    entries: Vec<IatEntryDetail>,
    #[serde(rename = "batchControl")]
    control: BatchControl,
    #[serde(skip)]
    opts: ValidateOpts,
}

impl IatBatch {
    /// Opens an empty batch. The header must carry the `IAT` SEC code.
    pub fn new(header: IatBatchHeader) -> Result<Self> {
        if header.standard_entry_class_code.trim() != SecCode::Iat.as_str() {
            return Err(Error::consistency(
                "IATBatchHeader",
                ConsistencyError::SecMismatch {
                    expected: SecCode::Iat,
                    actual: header.standard_entry_class_code,
                },
            ));
        }
        Ok(Self { header, ..Self::default() })
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

    #[must_use]
    pub fn header(&self) -> &IatBatchHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut IatBatchHeader {
        &mut self.header
    }

    #[must_use]
    pub fn entries(&self) -> &[IatEntryDetail] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [IatEntryDetail] {
        &mut self.entries
    }

    pub fn add_entry(&mut self, entry: IatEntryDetail) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn batch_control(&self) -> &BatchControl {
        &self.control
    }

    pub fn set_batch_control(&mut self, control: BatchControl) {
        self.control = control;
    }

    pub fn set_batch_number(&mut self, number: u32) {
        self.header.batch_number = number;
        self.control.batch_number = number;
    }

    #[must_use]
    pub fn totals(&self) -> ControlTotals {
        ControlTotals {
            entry_addenda_count: self.control.entry_addenda_count.into(),
            entry_hash: self.control.entry_hash,
            total_debit: self.control.total_debit_entry_dollar_amount,
            total_credit: self.control.total_credit_entry_dollar_amount,
        }
    }

    #[must_use]
    pub fn calculate_totals(&self) -> ControlTotals {
        let mut totals = ControlTotals::default();
        for entry in &self.entries {
            totals.add_entry(
                entry.hash_component(),
                entry.addenda_count(),
                entry.direction(),
                entry.amount,
            );
        }
        totals
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.entries.iter().map(|e| 1 + e.addenda_count()).sum::<usize>() + 2
    }

    /// Assigns trace numbers, numbers the addenda legs, recomputes the
    /// control record and validates the result.
    pub fn create(&mut self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::consistency("", ConsistencyError::NoEntries));
        }
        assign_traces(
            &self.header.odfi_identification,
            self.entries.iter_mut().map(|e| &mut e.trace_number),
            self.opts.custom_trace_numbers,
        );
        for entry in &mut self.entries {
            entry.sync_addenda();
        }

        let totals = self.calculate_totals();
        self.control = BatchControl {
            service_class_code: self.header.service_class_code,
            entry_addenda_count: narrow_count(totals.entry_addenda_count),
            entry_hash: totals.entry_hash,
            total_debit_entry_dollar_amount: totals.total_debit,
            total_credit_entry_dollar_amount: totals.total_credit,
            company_identification: self.header.originator_identification.clone(),
            message_authentication_code: std::mem::take(
                &mut self.control.message_authentication_code,
            ),
            odfi_identification: self.header.odfi_identification.clone(),
            batch_number: self.header.batch_number,
        };
        debug!(
            batch_number = self.header.batch_number,
            entries = self.entries.len(),
            "IAT batch created"
        );
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_with(&self.opts)
    }

    pub fn validate_with(&self, opts: &ValidateOpts) -> Result<()> {
        if opts.skip_all {
            return Ok(());
        }
        self.header.validate(opts).map_err(|e| Error::field("IATBatchHeader", e))?;
        self.control.validate(opts).map_err(|e| Error::field("batchControl", e))?;
        if self.entries.is_empty() {
            return Err(Error::consistency("", ConsistencyError::NoEntries));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            let prefix = format!("IATEntryDetails[{i}]");
            entry.validate(opts).map_err(|e| e.prefixed(&prefix))?;
            check_legs(entry, opts).map_err(|e| e.prefixed(&prefix))?;
        }
        let path = |i: usize| format!("IATEntryDetails[{i}]");
        check_traces(
            &self.header.odfi_identification,
            self.entries.iter().map(|e| e.trace_number.as_str()),
            path,
            opts,
        )?;
        check_service_class_direction(
            self.header.service_class_code,
            self.entries.iter().map(|e| (e.transaction_code, e.direction())),
            path,
        )?;
        check_envelope(
            &Envelope {
                service_class_code: self.header.service_class_code,
                company_identification: Some(&self.header.originator_identification),
                odfi_identification: &self.header.odfi_identification,
                batch_number: self.header.batch_number,
            },
            &Envelope {
                service_class_code: self.control.service_class_code,
                company_identification: Some(&self.control.company_identification),
                odfi_identification: &self.control.odfi_identification,
                batch_number: self.control.batch_number,
            },
            opts,
        )?;
        self.calculate_totals()
            .check_recorded(&self.totals(), BATCH_TOTAL_FIELDS)
            .map_err(|e| Error::consistency("batchControl", e))
    }
}

/// Presence, cardinality and numbering of the addenda legs of one entry.
fn check_legs(entry: &IatEntryDetail, opts: &ValidateOpts) -> Result<()> {
    let sec = SecCode::Iat;
    let rules = sec.rules();
    let present: Vec<AddendaTag> = entry.addenda_records().iter().map(|a| a.tag()).collect();
    if let RequiredAddenda::All(tags) = rules.required_addenda
        && let Some(&addenda) = tags.iter().find(|tag| !present.contains(tag))
    {
        return Err(Error::consistency("", ConsistencyError::AddendaRequired { sec, addenda }));
    }
    for (addenda, max, found) in [
        (AddendaTag::Addenda17, MAX_ADDENDA17, entry.addenda17.len()),
        (AddendaTag::Addenda18, MAX_ADDENDA18, entry.addenda18.len()),
    ] {
        if found > max {
            return Err(Error::consistency(
                "",
                ConsistencyError::AddendaCardinality { sec, addenda, max, found },
            ));
        }
    }
    if !opts.unequal_addenda_counts && usize::from(entry.addenda_records) != present.len() {
        return Err(Error::consistency(
            "",
            ConsistencyError::AddendaSequence {
                field: "addendaRecords",
                expected: u64::try_from(present.len()).unwrap_or(u64::MAX),
                actual: entry.addenda_records.into(),
            },
        ));
    }

    let expected = u64::from(entry.trace_sequence());
    let mut sequences: Vec<(String, u32)> = [
        ("addenda10", entry.addenda10.as_ref().map(|a| a.entry_detail_sequence_number)),
        ("addenda11", entry.addenda11.as_ref().map(|a| a.entry_detail_sequence_number)),
        ("addenda12", entry.addenda12.as_ref().map(|a| a.entry_detail_sequence_number)),
        ("addenda13", entry.addenda13.as_ref().map(|a| a.entry_detail_sequence_number)),
        ("addenda14", entry.addenda14.as_ref().map(|a| a.entry_detail_sequence_number)),
        ("addenda15", entry.addenda15.as_ref().map(|a| a.entry_detail_sequence_number)),
        ("addenda16", entry.addenda16.as_ref().map(|a| a.entry_detail_sequence_number)),
    ]
    .into_iter()
    .filter_map(|(path, seq)| seq.map(|seq| (path.to_string(), seq)))
    .collect();
    sequences.extend(
        entry
            .addenda17
            .iter()
            .enumerate()
            .map(|(i, a)| (format!("addenda17[{i}]"), a.entry_detail_sequence_number)),
    );
    sequences.extend(
        entry
            .addenda18
            .iter()
            .enumerate()
            .map(|(i, a)| (format!("addenda18[{i}]"), a.entry_detail_sequence_number)),
    );
    for (path, actual) in sequences {
        if u64::from(actual) != expected {
            return Err(Error::consistency(
                path,
                ConsistencyError::AddendaSequence {
                    field: "entryDetailSequenceNumber",
                    expected,
                    actual: actual.into(),
                },
            ));
        }
    }

    let numbered = entry
        .addenda17
        .iter()
        .enumerate()
        .map(|(i, a)| (format!("addenda17[{i}]"), i, a.sequence_number))
        .chain(
            entry
                .addenda18
                .iter()
                .enumerate()
                .map(|(i, a)| (format!("addenda18[{i}]"), i, a.sequence_number)),
        );
    for (path, i, actual) in numbered {
        let expected = u64::try_from(i + 1).unwrap_or(u64::MAX);
        if u64::from(actual) != expected {
            return Err(Error::consistency(
                path,
                ConsistencyError::AddendaSequence {
                    field: "sequenceNumber",
                    expected,
                    actual: actual.into(),
                },
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::{
        Addenda18, codes,
        iat::tests::{entry, header},
    };

    pub(crate) fn iat_batch() -> IatBatch {
        let mut batch = IatBatch::new(header()).unwrap();
        batch.add_entry(entry());
        batch.create().unwrap();
        batch
    }

    #[test]
    fn test_create() {
        let batch = iat_batch();
        let control = batch.batch_control();
        assert_eq!(control.entry_addenda_count, 8);
        assert_eq!(control.entry_hash, 12_104_288);
        assert_eq!(control.total_credit_entry_dollar_amount, 100_000);
        assert_eq!(control.company_identification, "123456789");
        assert_eq!(batch.entries()[0].trace_number, "231380100000001");
        assert_eq!(batch.line_count(), 10);
    }

    #[test]
    fn test_wrong_sec() {
        let header = IatBatchHeader { standard_entry_class_code: "PPD".to_string(), ..header() };
        assert!(IatBatch::new(header).is_err());
    }

    #[test]
    fn test_missing_leg() {
        let mut batch = iat_batch();
        batch.entries_mut()[0].addenda14 = None;
        batch.entries_mut()[0].addenda15 = None;
        let err = batch.create().unwrap_err();
        assert_eq!(err.path(), Some("IATEntryDetails[0]"));
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::AddendaRequired { addenda: AddendaTag::Addenda14, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_too_many_addenda18() {
        let mut batch = iat_batch();
        let bank = Addenda18 {
            foreign_correspondent_bank_name: "Bank of Canada".to_string(),
            foreign_correspondent_bank_id_number_qualifier: "01".to_string(),
            foreign_correspondent_bank_id_number: "987987987654654".to_string(),
            foreign_correspondent_bank_branch_country_code: "CA".to_string(),
            ..Addenda18::default()
        };
        batch.entries_mut()[0].addenda18 = vec![bank; 6];
        let err = batch.create().unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::AddendaCardinality { max: 5, found: 6, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_addenda_records_count() {
        let mut batch = iat_batch();
        batch.entries_mut()[0].addenda_records = 3;
        let err = batch.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::AddendaSequence { field: "addendaRecords", .. },
                ..
            }
        ));
        let relaxed = ValidateOpts { unequal_addenda_counts: true, ..Default::default() };
        assert!(batch.validate_with(&relaxed).is_ok());
    }

    #[test]
    fn test_leg_sequence() {
        let mut batch = iat_batch();
        batch.entries_mut()[0].addenda12.as_mut().unwrap().entry_detail_sequence_number = 9;
        let err = batch.validate().unwrap_err();
        assert_eq!(err.path(), Some("IATEntryDetails[0].addenda12"));
    }

    #[test]
    fn test_credits_only_rejects_debit() {
        let mut batch = IatBatch::new(header()).unwrap();
        let mut debit = entry();
        debit.transaction_code = codes::CHECKING_DEBIT;
        batch.add_entry(entry());
        batch.add_entry(debit);
        let err = batch.create().unwrap_err();
        assert_eq!(err.path(), Some("IATEntryDetails[1]"));
    }

    #[test]
    fn test_json_names() {
        let batch = iat_batch();
        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains(r#""IATBatchHeader""#));
        assert!(json.contains(r#""IATEntryDetails""#));
        let back: IatBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);
    }
}
