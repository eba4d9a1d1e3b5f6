//! Batches of standard and ADV entries.
//!
//! A [`Batch`] is typed by the SEC code of its header: the code is resolved
//! against the registry once, in [`Batch::new`], and every later `create()`
//! and `validate()` consults the same [`SecRules`]. ADV batches hold
//! [`AdvEntryDetail`] records and an [`AdvBatchControl`]; every other SEC
//! code holds [`EntryDetail`] records and a [`BatchControl`].
//!
//! IAT batches have their own header and entry layout and live in
//! [`IatBatch`](crate::IatBatch).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ConsistencyError, Error, FieldError, FieldErrorKind, Result},
    opts::ValidateOpts,
    record::{
        AdvBatchControl, AdvEntryDetail, BatchControl, BatchHeader, Category, Direction,
        EntryDetail, codes,
    },
    rules::{SecCode, SecRules},
};

/// Modulus of batch and file entry hashes.
pub const ENTRY_HASH_MODULUS: u64 = 10_000_000_000;

// ============================================================================
// Control totals
// ============================================================================

/// Counts and sums carried by Batch Control and File Control records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlTotals {
    pub entry_addenda_count: u64,
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
}

impl ControlTotals {
    pub(crate) fn add_entry(
        &mut self,
        hash: u64,
        addenda: usize,
        direction: Option<Direction>,
        amount: u64,
    ) {
        let records = u64::try_from(addenda).unwrap_or(u64::MAX).saturating_add(1);
        self.entry_addenda_count = self.entry_addenda_count.saturating_add(records);
        self.entry_hash = (self.entry_hash + hash % ENTRY_HASH_MODULUS) % ENTRY_HASH_MODULUS;
        match direction {
            Some(Direction::Credit) => self.total_credit = self.total_credit.saturating_add(amount),
            Some(Direction::Debit) => self.total_debit = self.total_debit.saturating_add(amount),
            None => {}
        }
    }

    /// Folds the totals of one batch into file totals.
    pub(crate) fn add_batch(&mut self, batch: &Self) {
        self.entry_addenda_count =
            self.entry_addenda_count.saturating_add(batch.entry_addenda_count);
        self.entry_hash =
            (self.entry_hash + batch.entry_hash % ENTRY_HASH_MODULUS) % ENTRY_HASH_MODULUS;
        self.total_debit = self.total_debit.saturating_add(batch.total_debit);
        self.total_credit = self.total_credit.saturating_add(batch.total_credit);
    }

    /// Compares calculated totals (`self`) with the ones recorded in a
    /// control record. `names` are the control field names, in field order.
    pub(crate) fn check_recorded(
        &self,
        recorded: &Self,
        names: [&'static str; 4],
    ) -> std::result::Result<(), ConsistencyError> {
        let pairs = [
            (self.entry_addenda_count, recorded.entry_addenda_count),
            (self.entry_hash, recorded.entry_hash),
            (self.total_debit, recorded.total_debit),
            (self.total_credit, recorded.total_credit),
        ];
        for (field, (expected, actual)) in names.into_iter().zip(pairs) {
            if expected != actual {
                return Err(ConsistencyError::Aggregate { field, expected, actual });
            }
        }
        Ok(())
    }
}

pub(crate) const BATCH_TOTAL_FIELDS: [&str; 4] = [
    "entryAddendaCount",
    "entryHash",
    "totalDebitEntryDollarAmount",
    "totalCreditEntryDollarAmount",
];

pub(crate) fn narrow_count(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

// ============================================================================
// Header/control agreement and trace numbers, shared with IAT batches
// ============================================================================

/// Fields a batch header and its control record must agree on.
pub(crate) struct Envelope<'a> {
    pub service_class_code: u16,
    pub company_identification: Option<&'a str>,
    pub odfi_identification: &'a str,
    pub batch_number: u32,
}

pub(crate) fn check_envelope(
    header: &Envelope<'_>,
    control: &Envelope<'_>,
    opts: &ValidateOpts,
) -> Result<()> {
    let mismatch = |field: &'static str, header: String, control: String| {
        Err(Error::consistency(
            "batchControl",
            ConsistencyError::HeaderControlMismatch { field, header, control },
        ))
    };
    if !opts.unequal_service_class_code && header.service_class_code != control.service_class_code
    {
        return mismatch(
            "serviceClassCode",
            header.service_class_code.to_string(),
            control.service_class_code.to_string(),
        );
    }
    if let (Some(h), Some(c)) = (header.company_identification, control.company_identification)
        && !opts.bypass_company_identification_match
        && h.trim() != c.trim()
    {
        return mismatch("companyIdentification", h.to_string(), c.to_string());
    }
    if header.odfi_identification != control.odfi_identification {
        return mismatch(
            "ODFIIdentification",
            header.odfi_identification.to_string(),
            control.odfi_identification.to_string(),
        );
    }
    if header.batch_number != control.batch_number {
        return mismatch(
            "batchNumber",
            header.batch_number.to_string(),
            control.batch_number.to_string(),
        );
    }
    Ok(())
}

/// Trace numbers start with the ODFI identification and ascend. `path` builds
/// the record path of the n-th entry.
pub(crate) fn check_traces<'a>(
    odfi: &str,
    traces: impl Iterator<Item = &'a str>,
    path: impl Fn(usize) -> String,
    opts: &ValidateOpts,
) -> Result<()> {
    if opts.custom_trace_numbers {
        return Ok(());
    }
    let mut previous: Option<&str> = None;
    for (i, trace) in traces.enumerate() {
        if !trace.starts_with(odfi) {
            return Err(Error::consistency(
                path(i),
                ConsistencyError::TracePrefix { trace: trace.to_string(), odfi: odfi.to_string() },
            ));
        }
        if let Some(previous) = previous
            && trace <= previous
        {
            return Err(Error::consistency(
                path(i),
                ConsistencyError::TraceNumberOrder {
                    previous: previous.to_string(),
                    trace: trace.to_string(),
                },
            ));
        }
        previous = Some(trace);
    }
    Ok(())
}

/// Trace number for the `sequence`-th entry of a batch.
pub(crate) fn trace_number(odfi: &str, sequence: usize) -> String {
    format!("{odfi:0>8.8}{:07}", sequence % 10_000_000)
}

/// Fills in trace numbers that are blank, lack the ODFI prefix or would break
/// the ascending order; valid preset traces are kept. With `custom` set only
/// blank traces are touched.
pub(crate) fn assign_traces<'a>(
    odfi: &str,
    traces: impl Iterator<Item = &'a mut String>,
    custom: bool,
) {
    let mut last = 0;
    for (i, trace) in traces.enumerate() {
        if custom {
            if trace.trim().is_empty() {
                *trace = trace_number(odfi, i + 1);
            }
            continue;
        }
        match preset_sequence(odfi, trace) {
            Some(sequence) if sequence > last => last = sequence,
            _ => {
                last += 1;
                *trace = trace_number(odfi, last);
            }
        }
    }
}

fn preset_sequence(odfi: &str, trace: &str) -> Option<usize> {
    let sequence = trace.strip_prefix(odfi)?;
    if trace.len() != 15 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    sequence.parse().ok()
}

/// Service class codes 220 and 225 restrict the direction of every entry.
pub(crate) fn check_service_class_direction(
    service_class_code: u16,
    directions: impl Iterator<Item = (u8, Option<Direction>)>,
    path: impl Fn(usize) -> String,
) -> Result<()> {
    let (forbidden, rule) = match service_class_code {
        codes::CREDITS_ONLY => (Direction::Debit, "service class 220 (credits only)"),
        codes::DEBITS_ONLY => (Direction::Credit, "service class 225 (debits only)"),
        _ => return Ok(()),
    };
    for (i, (code, direction)) in directions.enumerate() {
        if direction == Some(forbidden) {
            return Err(Error::consistency(path(i), ConsistencyError::Direction { code, rule }));
        }
    }
    Ok(())
}

// ============================================================================
// Batch
// ============================================================================

/// Entries and control record of a batch, by entry layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchBody {
    Standard { entries: Vec<EntryDetail>, control: BatchControl },
    Adv { entries: Vec<AdvEntryDetail>, control: AdvBatchControl },
}

/// A batch of entries sharing one header, control record and SEC code.
///
/// # Example
///
/// ```
/// use ach::{Batch, BatchHeader, EntryDetail, record::codes};
///
/// let header = BatchHeader {
///     company_name: "Acme Corp".to_string(),
///     company_identification: "121042882".to_string(),
///     standard_entry_class_code: "PPD".to_string(),
///     company_entry_description: "PAYROLL".to_string(),
///     odfi_identification: "12104288".to_string(),
///     ..BatchHeader::default()
/// };
/// let mut batch = Batch::new(header)?;
/// let mut entry = EntryDetail::new(codes::CHECKING_CREDIT, "231380104", "12345678", 100_000);
/// entry.individual_name = "Jane Doe".to_string();
/// batch.add_entry(entry)?;
/// batch.create()?;
///
/// assert_eq!(batch.totals().total_credit, 100_000);
/// assert_eq!(batch.entries()[0].trace_number, "121042880000001");
/// # Ok::<(), ach::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BatchRepr", into = "BatchRepr")]
pub struct Batch {
    /// Opaque identifier for callers; never written to the file.
    pub id: String,
    sec: SecCode,
    header: BatchHeader,
    body: BatchBody,
    opts: ValidateOpts,
}

impl Batch {
    /// Opens an empty batch for the SEC code of `header`.
    ///
    /// Fails with [`ConsistencyError::UnknownSec`] for codes outside the
    /// registry, and for `IAT`, whose header layout differs.
    pub fn new(header: BatchHeader) -> Result<Self> {
        let sec = Self::resolve_sec(&header.standard_entry_class_code)
            .map_err(|e| Error::consistency("batchHeader", e))?;
        let body = if sec == SecCode::Adv {
            BatchBody::Adv { entries: Vec::new(), control: AdvBatchControl::default() }
        } else {
            BatchBody::Standard { entries: Vec::new(), control: BatchControl::default() }
        };
        Ok(Self { id: String::new(), sec, header, body, opts: ValidateOpts::default() })
    }

    fn resolve_sec(code: &str) -> std::result::Result<SecCode, ConsistencyError> {
        match code.trim().parse()? {
            SecCode::Iat => Err(ConsistencyError::WrongEntryKind { sec: SecCode::Iat }),
            sec => Ok(sec),
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

    #[must_use]
    pub fn sec_code(&self) -> SecCode {
        self.sec
    }

    #[must_use]
    pub fn rules(&self) -> &'static SecRules {
        self.sec.rules()
    }

    #[must_use]
    pub fn is_adv(&self) -> bool {
        matches!(self.body, BatchBody::Adv { .. })
    }

    #[must_use]
    pub fn header(&self) -> &BatchHeader {
        &self.header
    }

    /// Mutable header. Changing the SEC code here makes `validate()` fail;
    /// open a new batch instead.
    pub fn header_mut(&mut self) -> &mut BatchHeader {
        &mut self.header
    }

    #[must_use]
    pub fn body(&self) -> &BatchBody {
        &self.body
    }

    /// Entries of a standard batch; empty for ADV batches.
    #[must_use]
    pub fn entries(&self) -> &[EntryDetail] {
        match &self.body {
            BatchBody::Standard { entries, .. } => entries,
            BatchBody::Adv { .. } => &[],
        }
    }

    pub fn entries_mut(&mut self) -> &mut [EntryDetail] {
        match &mut self.body {
            BatchBody::Standard { entries, .. } => entries,
            BatchBody::Adv { .. } => &mut [],
        }
    }

    /// Entries of an ADV batch; empty for every other batch.
    #[must_use]
    pub fn adv_entries(&self) -> &[AdvEntryDetail] {
        match &self.body {
            BatchBody::Adv { entries, .. } => entries,
            BatchBody::Standard { .. } => &[],
        }
    }

    pub fn add_entry(&mut self, entry: EntryDetail) -> Result<()> {
        match &mut self.body {
            BatchBody::Standard { entries, .. } => {
                entries.push(entry);
                Ok(())
            }
            BatchBody::Adv { .. } => Err(self.wrong_kind()),
        }
    }

    pub fn add_adv_entry(&mut self, entry: AdvEntryDetail) -> Result<()> {
        match &mut self.body {
            BatchBody::Adv { entries, .. } => {
                entries.push(entry);
                Ok(())
            }
            BatchBody::Standard { .. } => Err(self.wrong_kind()),
        }
    }

    fn wrong_kind(&self) -> Error {
        Error::consistency("", ConsistencyError::WrongEntryKind { sec: self.sec })
    }

    #[must_use]
    pub fn batch_control(&self) -> Option<&BatchControl> {
        match &self.body {
            BatchBody::Standard { control, .. } => Some(control),
            BatchBody::Adv { .. } => None,
        }
    }

    #[must_use]
    pub fn adv_batch_control(&self) -> Option<&AdvBatchControl> {
        match &self.body {
            BatchBody::Adv { control, .. } => Some(control),
            BatchBody::Standard { .. } => None,
        }
    }

    /// Replaces the control record, as read from a file.
    pub fn set_batch_control(&mut self, new: BatchControl) -> Result<()> {
        match &mut self.body {
            BatchBody::Standard { control, .. } => {
                *control = new;
                Ok(())
            }
            BatchBody::Adv { .. } => Err(self.wrong_kind()),
        }
    }

    pub fn set_adv_batch_control(&mut self, new: AdvBatchControl) -> Result<()> {
        match &mut self.body {
            BatchBody::Adv { control, .. } => {
                *control = new;
                Ok(())
            }
            BatchBody::Standard { .. } => Err(self.wrong_kind()),
        }
    }

    /// Renumbers the batch in both header and control.
    pub fn set_batch_number(&mut self, number: u32) {
        self.header.batch_number = number;
        match &mut self.body {
            BatchBody::Standard { control, .. } => control.batch_number = number,
            BatchBody::Adv { control, .. } => control.batch_number = number,
        }
    }

    /// Totals as recorded in the control record.
    #[must_use]
    pub fn totals(&self) -> ControlTotals {
        match &self.body {
            BatchBody::Standard { control, .. } => ControlTotals {
                entry_addenda_count: control.entry_addenda_count.into(),
                entry_hash: control.entry_hash,
                total_debit: control.total_debit_entry_dollar_amount,
                total_credit: control.total_credit_entry_dollar_amount,
            },
            BatchBody::Adv { control, .. } => ControlTotals {
                entry_addenda_count: control.entry_addenda_count.into(),
                entry_hash: control.entry_hash,
                total_debit: control.total_debit_entry_dollar_amount,
                total_credit: control.total_credit_entry_dollar_amount,
            },
        }
    }

    /// Totals calculated from the entries.
    #[must_use]
    pub fn calculate_totals(&self) -> ControlTotals {
        let mut totals = ControlTotals::default();
        match &self.body {
            BatchBody::Standard { entries, .. } => {
                for entry in entries {
                    totals.add_entry(
                        entry.hash_component(),
                        entry.addenda_count(),
                        entry.direction(),
                        entry.amount,
                    );
                }
            }
            BatchBody::Adv { entries, .. } => {
                for entry in entries {
                    totals.add_entry(entry.hash_component(), 0, entry.direction(), entry.amount);
                }
            }
        }
        totals
    }

    /// Lines the batch occupies in a file: header, entries, addenda and control.
    #[must_use]
    pub fn line_count(&self) -> usize {
        let records = match &self.body {
            BatchBody::Standard { entries, .. } => {
                entries.iter().map(|e| 1 + e.addenda_count()).sum::<usize>()
            }
            BatchBody::Adv { entries, .. } => entries.len(),
        };
        records + 2
    }

    /// Number of entries, addenda excluded.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        match &self.body {
            BatchBody::Standard { entries, .. } => entries.len(),
            BatchBody::Adv { entries, .. } => entries.len(),
        }
    }

    /// Category shared by the entries of the batch (forward for empty batches).
    #[must_use]
    pub fn category(&self) -> Category {
        self.entries().first().map_or(Category::Forward, EntryDetail::category)
    }

    /// Assigns trace numbers, fills in addenda sequence fields, recomputes the
    /// control record and validates the result.
    ///
    /// Aggregates are rebuilt from scratch, so calling `create()` again after
    /// a mutation is always safe.
    pub fn create(&mut self) -> Result<()> {
        let odfi = self.header.odfi_identification.clone();
        let custom_traces = self.opts.custom_trace_numbers;
        match &mut self.body {
            BatchBody::Standard { entries, .. } => {
                if entries.is_empty() {
                    return Err(Error::consistency("", ConsistencyError::NoEntries));
                }
                let traces = entries.iter_mut().map(|e| &mut e.trace_number);
                assign_traces(&odfi, traces, custom_traces);
                for entry in entries.iter_mut() {
                    entry.sync_addenda();
                }
            }
            BatchBody::Adv { entries, .. } => {
                if entries.is_empty() {
                    return Err(Error::consistency("", ConsistencyError::NoEntries));
                }
                for (i, entry) in entries.iter_mut().enumerate() {
                    entry.sequence_number = u16::try_from((i + 1) % 10_000).unwrap_or(0);
                }
            }
        }
        self.rebuild_control();
        debug!(
            sec = %self.sec,
            batch_number = self.header.batch_number,
            entries = self.entry_count(),
            "batch created"
        );
        self.validate()
    }

    fn rebuild_control(&mut self) {
        let totals = self.calculate_totals();
        let header = &self.header;
        match &mut self.body {
            BatchBody::Standard { control, .. } => {
                *control = BatchControl {
                    service_class_code: header.service_class_code,
                    entry_addenda_count: narrow_count(totals.entry_addenda_count),
                    entry_hash: totals.entry_hash,
                    total_debit_entry_dollar_amount: totals.total_debit,
                    total_credit_entry_dollar_amount: totals.total_credit,
                    company_identification: header.company_identification.clone(),
                    message_authentication_code: std::mem::take(
                        &mut control.message_authentication_code,
                    ),
                    odfi_identification: header.odfi_identification.clone(),
                    batch_number: header.batch_number,
                };
            }
            BatchBody::Adv { control, .. } => {
                *control = AdvBatchControl {
                    service_class_code: header.service_class_code,
                    entry_addenda_count: narrow_count(totals.entry_addenda_count),
                    entry_hash: totals.entry_hash,
                    total_debit_entry_dollar_amount: totals.total_debit,
                    total_credit_entry_dollar_amount: totals.total_credit,
                    ach_operator_data: std::mem::take(&mut control.ach_operator_data),
                    odfi_identification: header.odfi_identification.clone(),
                    batch_number: header.batch_number,
                };
            }
        }
    }

    /// Validates with the options carried by the batch.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&self.opts)
    }

    /// Structural and consistency checks of the batch. Never mutates.
    ///
    /// A field that breaks its width or character rules, such as an
    /// `Addenda05` payment text over 80 characters, is reported as
    /// [`Error::Field`] with the record path (`entries[0].addenda05[0]`).
    /// Disagreements between records are [`Error::Consistency`].
    pub fn validate_with(&self, opts: &ValidateOpts) -> Result<()> {
        if opts.skip_all {
            return Ok(());
        }
        self.validate_header(opts)?;
        match &self.body {
            BatchBody::Standard { entries, control } => {
                self.validate_standard(entries, control, opts)
            }
            BatchBody::Adv { entries, control } => self.validate_adv(entries, control, opts),
        }
    }

    fn validate_header(&self, opts: &ValidateOpts) -> Result<()> {
        let header = &self.header;
        header.validate(opts).map_err(|e| Error::field("batchHeader", e))?;
        if header.standard_entry_class_code.trim() != self.sec.as_str() {
            return Err(Error::consistency(
                "batchHeader",
                ConsistencyError::SecMismatch {
                    expected: self.sec,
                    actual: header.standard_entry_class_code.clone(),
                },
            ));
        }
        let adv_class = header.service_class_code == codes::AUTOMATED_ACCOUNTING_ADVICES;
        if adv_class != self.is_adv() {
            return Err(Error::field(
                "batchHeader",
                FieldError::new(
                    "serviceClassCode",
                    header.service_class_code.to_string(),
                    FieldErrorKind::InvalidCode,
                ),
            ));
        }
        if let Some(description) = self.rules().company_entry_description
            && header.company_entry_description.trim() != description
        {
            return Err(Error::field(
                "batchHeader",
                FieldError::new(
                    "companyEntryDescription",
                    &header.company_entry_description,
                    FieldErrorKind::Invalid,
                ),
            ));
        }
        Ok(())
    }

    fn validate_standard(
        &self,
        entries: &[EntryDetail],
        control: &BatchControl,
        opts: &ValidateOpts,
    ) -> Result<()> {
        control.validate(opts).map_err(|e| Error::field("batchControl", e))?;
        if entries.is_empty() {
            return Err(Error::consistency("", ConsistencyError::NoEntries));
        }
        let rules = self.rules();
        for (i, entry) in entries.iter().enumerate() {
            let prefix = format!("entries[{i}]");
            entry.validate(opts).map_err(|e| e.prefixed(&prefix))?;
            rules.check_entry(entry, opts).map_err(|e| e.prefixed(&prefix))?;
            check_addenda_links(entry).map_err(|e| e.prefixed(&prefix))?;
        }
        let category = entries[0].category();
        if let Some(i) = entries.iter().position(|e| e.category() != category) {
            return Err(Error::consistency(
                format!("entries[{i}]"),
                ConsistencyError::MixedCategories,
            ));
        }
        check_traces(
            &self.header.odfi_identification,
            entries.iter().map(|e| e.trace_number.as_str()),
            |i| format!("entries[{i}]"),
            opts,
        )?;
        check_service_class_direction(
            self.header.service_class_code,
            entries.iter().map(|e| (e.transaction_code, e.direction())),
            |i| format!("entries[{i}]"),
        )?;
        check_envelope(
            &Envelope {
                service_class_code: self.header.service_class_code,
                company_identification: Some(&self.header.company_identification),
                odfi_identification: &self.header.odfi_identification,
                batch_number: self.header.batch_number,
            },
            &Envelope {
                service_class_code: control.service_class_code,
                company_identification: Some(&control.company_identification),
                odfi_identification: &control.odfi_identification,
                batch_number: control.batch_number,
            },
            opts,
        )?;
        self.calculate_totals()
            .check_recorded(&self.totals(), BATCH_TOTAL_FIELDS)
            .map_err(|e| Error::consistency("batchControl", e))
    }

    fn validate_adv(
        &self,
        entries: &[AdvEntryDetail],
        control: &AdvBatchControl,
        opts: &ValidateOpts,
    ) -> Result<()> {
        control.validate(opts).map_err(|e| Error::field("advBatchControl", e))?;
        if entries.is_empty() {
            return Err(Error::consistency("", ConsistencyError::NoEntries));
        }
        for (i, entry) in entries.iter().enumerate() {
            entry.validate(opts).map_err(|e| Error::field(format!("advEntries[{i}]"), e))?;
        }
        check_envelope(
            &Envelope {
                service_class_code: self.header.service_class_code,
                company_identification: None,
                odfi_identification: &self.header.odfi_identification,
                batch_number: self.header.batch_number,
            },
            &Envelope {
                service_class_code: control.service_class_code,
                company_identification: None,
                odfi_identification: &control.odfi_identification,
                batch_number: control.batch_number,
            },
            opts,
        )
        .map_err(|e| match e {
            Error::Consistency { error, .. } => Error::consistency("advBatchControl", error),
            other => other,
        })?;
        self.calculate_totals()
            .check_recorded(&self.totals(), BATCH_TOTAL_FIELDS)
            .map_err(|e| Error::consistency("advBatchControl", e))
    }
}

/// Addenda fields that repeat data of their entry: the addenda indicator,
/// Addenda05 sequence numbers and the trace numbers of single addenda.
fn check_addenda_links(entry: &EntryDetail) -> Result<()> {
    let count = entry.addenda_count();
    if entry.addenda_record_indicator != u8::from(count > 0) {
        return Err(Error::consistency(
            "",
            ConsistencyError::AddendaIndicator { indicator: entry.addenda_record_indicator, count },
        ));
    }
    let entry_sequence = u64::from(entry.trace_sequence());
    for (i, addenda) in entry.addenda05.iter().enumerate() {
        let path = format!("addenda05[{i}]");
        let expected = u64::try_from(i + 1).unwrap_or(u64::MAX);
        if u64::from(addenda.sequence_number) != expected {
            return Err(Error::consistency(
                path,
                ConsistencyError::AddendaSequence {
                    field: "sequenceNumber",
                    expected,
                    actual: addenda.sequence_number.into(),
                },
            ));
        }
        if u64::from(addenda.entry_detail_sequence_number) != entry_sequence {
            return Err(Error::consistency(
                path,
                ConsistencyError::AddendaSequence {
                    field: "entryDetailSequenceNumber",
                    expected: entry_sequence,
                    actual: addenda.entry_detail_sequence_number.into(),
                },
            ));
        }
    }

    let trace = parse_trace(&entry.trace_number);
    let linked = [
        ("addenda02", entry.addenda02.as_ref().map(|a| a.trace_number.as_str())),
        ("addenda98", entry.addenda98.as_ref().map(|a| a.trace_number.as_str())),
        ("addenda98Refused", entry.addenda98_refused.as_ref().map(|a| a.trace_number.as_str())),
        ("addenda99", entry.addenda99.as_ref().map(|a| a.trace_number.as_str())),
        (
            "addenda99Contested",
            entry.addenda99_contested.as_ref().map(|a| a.trace_number.as_str()),
        ),
        (
            "addenda99Dishonored",
            entry.addenda99_dishonored.as_ref().map(|a| a.trace_number.as_str()),
        ),
    ];
    for (path, addenda_trace) in linked {
        if let Some(addenda_trace) = addenda_trace
            && parse_trace(addenda_trace) != trace
        {
            return Err(Error::consistency(
                path,
                ConsistencyError::AddendaSequence {
                    field: "traceNumber",
                    expected: trace,
                    actual: parse_trace(addenda_trace),
                },
            ));
        }
    }
    Ok(())
}

fn parse_trace(trace: &str) -> u64 {
    trace.trim().parse().unwrap_or(0)
}

// ============================================================================
// JSON representation
// ============================================================================

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BatchRepr {
    #[serde(skip_serializing_if = "String::is_empty")]
    id: String,
    batch_header: BatchHeader,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entry_details: Vec<EntryDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch_control: Option<BatchControl>,
    #[serde(rename = "advEntryDetails", skip_serializing_if = "Vec::is_empty")]
    adv_entry_details: Vec<AdvEntryDetail>,
    #[serde(rename = "advBatchControl", skip_serializing_if = "Option::is_none")]
    adv_batch_control: Option<AdvBatchControl>,
}

impl TryFrom<BatchRepr> for Batch {
    type Error = ConsistencyError;

    fn try_from(repr: BatchRepr) -> std::result::Result<Self, Self::Error> {
        let sec = Self::resolve_sec(&repr.batch_header.standard_entry_class_code)?;
        let misplaced = if sec == SecCode::Adv {
            [
                ("entryDetails", !repr.entry_details.is_empty()),
                ("batchControl", repr.batch_control.is_some()),
            ]
        } else {
            [
                ("advEntryDetails", !repr.adv_entry_details.is_empty()),
                ("advBatchControl", repr.adv_batch_control.is_some()),
            ]
        };
        if let Some((field, _)) = misplaced.into_iter().find(|(_, present)| *present) {
            return Err(ConsistencyError::MisplacedRecords { sec, field });
        }
        let body = if sec == SecCode::Adv {
            BatchBody::Adv {
                entries: repr.adv_entry_details,
                control: repr.adv_batch_control.unwrap_or_default(),
            }
        } else {
            BatchBody::Standard {
                entries: repr.entry_details,
                control: repr.batch_control.unwrap_or_default(),
            }
        };
        Ok(Self {
            id: repr.id,
            sec,
            header: repr.batch_header,
            body,
            opts: ValidateOpts::default(),
        })
    }
}

impl From<Batch> for BatchRepr {
    fn from(batch: Batch) -> Self {
        let mut repr = Self { id: batch.id, batch_header: batch.header, ..Self::default() };
        match batch.body {
            BatchBody::Standard { entries, control } => {
                repr.entry_details = entries;
                repr.batch_control = Some(control);
            }
            BatchBody::Adv { entries, control } => {
                repr.adv_entry_details = entries;
                repr.adv_batch_control = Some(control);
            }
        }
        repr
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::{Addenda05, Addenda99};

    pub(crate) fn ppd_header() -> BatchHeader {
        BatchHeader {
            service_class_code: codes::MIXED_DEBITS_AND_CREDITS,
            company_name: "Name on Account".to_string(),
            company_identification: "121042882".to_string(),
            standard_entry_class_code: "PPD".to_string(),
            company_entry_description: "REG.SALARY".to_string(),
            effective_entry_date: "190816".to_string(),
            odfi_identification: "12104288".to_string(),
            ..BatchHeader::default()
        }
    }

    pub(crate) fn credit(amount: u64) -> EntryDetail {
        EntryDetail {
            individual_name: "Receiver Account Name".to_string(),
            ..EntryDetail::new(codes::CHECKING_CREDIT, "231380104", "12345678", amount)
        }
    }

    pub(crate) fn debit(amount: u64) -> EntryDetail {
        EntryDetail {
            individual_name: "Receiver Account Name".to_string(),
            ..EntryDetail::new(codes::CHECKING_DEBIT, "076401251", "87654321", amount)
        }
    }

    pub(crate) fn ppd_batch(entries: Vec<EntryDetail>) -> Batch {
        let mut batch = Batch::new(ppd_header()).unwrap();
        for entry in entries {
            batch.add_entry(entry).unwrap();
        }
        batch.create().unwrap();
        batch
    }

    pub(crate) fn adv_batch() -> Batch {
        let header = BatchHeader {
            service_class_code: codes::AUTOMATED_ACCOUNTING_ADVICES,
            standard_entry_class_code: "ADV".to_string(),
            company_entry_description: "ACH ADV".to_string(),
            ..ppd_header()
        };
        let mut batch = Batch::new(header).unwrap();
        batch
            .add_adv_entry(AdvEntryDetail {
                transaction_code: codes::CREDIT_FOR_DEBITS_ORIGINATED,
                rdfi_identification: "23138010".to_string(),
                check_digit: 4,
                dfi_account_number: "744-5678-99".to_string(),
                amount: 50_000,
                advice_routing_number: "121042882".to_string(),
                file_identification: "11131".to_string(),
                individual_name: "Name".to_string(),
                ach_operator_routing_number: "01100001".to_string(),
                julian_day: "050".to_string(),
                ..AdvEntryDetail::default()
            })
            .unwrap();
        batch
    }

    #[test]
    fn test_ppd_single_credit() {
        let batch = ppd_batch(vec![credit(100_000_000)]);
        let control = batch.batch_control().unwrap();
        assert_eq!(control.total_credit_entry_dollar_amount, 100_000_000);
        assert_eq!(control.total_debit_entry_dollar_amount, 0);
        assert_eq!(control.entry_addenda_count, 1);
        assert_eq!(control.entry_hash, 23_138_010);
        assert_eq!(control.company_identification, "121042882");
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_unknown_sec() {
        for code in ["XYZ", "", "ppd", "IAT"] {
            let header =
                BatchHeader { standard_entry_class_code: code.to_string(), ..ppd_header() };
            let err = Batch::new(header).unwrap_err();
            assert!(matches!(err, Error::Consistency { .. }), "{code}");
        }
    }

    #[test]
    fn test_trace_numbers_and_hash() {
        let batch = ppd_batch(vec![credit(100), debit(200), credit(300)]);
        let traces: Vec<_> = batch.entries().iter().map(|e| e.trace_number.as_str()).collect();
        assert_eq!(traces, ["121042880000001", "121042880000002", "121042880000003"]);

        let totals = batch.totals();
        assert_eq!(totals.entry_hash, 23_138_010 + 7_640_125 + 23_138_010);
        assert_eq!((totals.total_credit, totals.total_debit), (400, 200));
    }

    #[test]
    fn test_create_keeps_preset_traces() {
        let preset = EntryDetail { trace_number: "121042880000005".to_string(), ..debit(200) };
        let foreign = EntryDetail { trace_number: "999999990000009".to_string(), ..credit(300) };
        let mut batch = ppd_batch(vec![credit(100), preset, credit(150), foreign]);
        let traces = |b: &Batch| -> Vec<String> {
            b.entries().iter().map(|e| e.trace_number.clone()).collect()
        };
        let expected =
            ["121042880000001", "121042880000005", "121042880000006", "121042880000007"];
        assert_eq!(traces(&batch), expected);

        batch.create().unwrap();
        assert_eq!(traces(&batch), expected);
    }

    #[test]
    fn test_entry_hash_wraps() {
        let mut totals = ControlTotals::default();
        for _ in 0..200 {
            totals.add_entry(99_999_999, 0, None, 0);
        }
        assert_eq!(totals.entry_hash, (99_999_999 * 200) % ENTRY_HASH_MODULUS);
    }

    #[test]
    fn test_custom_trace_numbers() {
        let mut batch = Batch::new(ppd_header())
            .unwrap()
            .with_validation(ValidateOpts { custom_trace_numbers: true, ..Default::default() });
        let entry = EntryDetail { trace_number: "999999990000042".to_string(), ..credit(1) };
        batch.add_entry(entry).unwrap();
        batch.add_entry(credit(2)).unwrap();
        batch.create().unwrap();
        assert_eq!(batch.entries()[0].trace_number, "999999990000042");
        assert_eq!(batch.entries()[1].trace_number, "121042880000002");
    }

    #[test]
    fn test_stale_control_detected() {
        let mut batch = ppd_batch(vec![credit(100)]);
        batch.entries_mut()[0].amount = 150;
        let err = batch.validate().unwrap_err();
        assert_eq!(err.path(), Some("batchControl"));
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::Aggregate {
                    field: "totalCreditEntryDollarAmount",
                    expected: 150,
                    actual: 100,
                },
                ..
            }
        ));

        batch.create().unwrap();
        assert_eq!(batch.totals().total_credit, 150);
    }

    #[test]
    fn test_oversized_addenda05() {
        let header = BatchHeader { standard_entry_class_code: "WEB".to_string(), ..ppd_header() };
        let mut batch = Batch::new(header).unwrap();
        let mut entry = credit(100);
        entry.addenda05.push(Addenda05::new(&"x".repeat(81)));
        batch.add_entry(entry).unwrap();
        let err = batch.create().unwrap_err();
        assert_eq!(err.path(), Some("entries[0].addenda05[0]"));
        assert!(matches!(
            err,
            Error::Field { error: FieldError { kind: FieldErrorKind::TooLong { max: 80 }, .. }, .. }
        ));
    }

    #[test]
    fn test_header_control_mismatch() {
        let mut batch = ppd_batch(vec![credit(100)]);
        let mut control = batch.batch_control().unwrap().clone();
        control.company_identification = "OTHER".to_string();
        batch.set_batch_control(control).unwrap();
        let err = batch.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::HeaderControlMismatch {
                    field: "companyIdentification",
                    ..
                },
                ..
            }
        ));

        let relaxed =
            ValidateOpts { bypass_company_identification_match: true, ..Default::default() };
        assert!(batch.validate_with(&relaxed).is_ok());
    }

    #[test]
    fn test_service_class_direction() {
        let mut batch = ppd_batch(vec![credit(100), debit(100)]);
        batch.header_mut().service_class_code = codes::CREDITS_ONLY;
        batch.create().unwrap_err();
        let err = batch.validate().unwrap_err();
        assert_eq!(err.path(), Some("entries[1]"));
    }

    #[test]
    fn test_mixed_categories() {
        let mut returned = credit(100);
        returned.transaction_code = codes::CHECKING_RETURN_NOC_CREDIT;
        returned.addenda99 = Some(Addenda99 {
            return_code: "R01".to_string(),
            original_trace: "121042880000001".to_string(),
            original_dfi: "12104288".to_string(),
            ..Addenda99::default()
        });
        let mut batch = Batch::new(ppd_header()).unwrap();
        batch.add_entry(credit(100)).unwrap();
        batch.add_entry(returned).unwrap();
        let err = batch.create().unwrap_err();
        assert!(matches!(err, Error::Consistency { error: ConsistencyError::MixedCategories, .. }));
    }

    #[test]
    fn test_addenda_indicator() {
        let mut batch = ppd_batch(vec![credit(100)]);
        batch.entries_mut()[0].addenda_record_indicator = 1;
        let err = batch.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency { error: ConsistencyError::AddendaIndicator { count: 0, .. }, .. }
        ));
    }

    #[test]
    fn test_required_description() {
        let header = BatchHeader {
            standard_entry_class_code: "XCK".to_string(),
            company_entry_description: "CHECKS".to_string(),
            ..ppd_header()
        };
        let mut batch = Batch::new(header).unwrap();
        let mut entry = debit(100);
        entry.set_check_serial_number("123456");
        batch.add_entry(entry).unwrap();
        let err = batch.create().unwrap_err();
        assert_eq!(err.path(), Some("batchHeader"));

        batch.header_mut().company_entry_description = "NO CHECK".to_string();
        assert!(batch.create().is_ok());
    }

    #[test]
    fn test_skip_all() {
        let mut batch = ppd_batch(vec![credit(100)]);
        batch.entries_mut()[0].amount = 5;
        assert!(batch.validate_with(&ValidateOpts::permissive()).is_ok());
    }

    #[test]
    fn test_adv_batch() {
        let mut batch = adv_batch();
        assert!(batch.add_entry(credit(1)).is_err());
        batch.create().unwrap();
        let control = batch.adv_batch_control().unwrap();
        assert_eq!(control.total_credit_entry_dollar_amount, 50_000);
        assert_eq!(batch.adv_entries()[0].sequence_number, 1);
        assert!(batch.batch_control().is_none());
        assert_eq!(batch.line_count(), 3);
    }

    #[test]
    fn test_json_roundtrip() {
        let batch = ppd_batch(vec![credit(100)]);
        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains(r#""batchHeader""#));
        assert!(json.contains(r#""entryDetails""#));
        assert!(!json.contains("advEntryDetails"));
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);

        let adv = adv_batch();
        let back: Batch = serde_json::from_str(&serde_json::to_string(&adv).unwrap()).unwrap();
        assert!(back.is_adv());
    }
}
