//! Entry Detail record (`6`) of standard batches.
//!
//! Several SEC codes reuse columns of the entry for their own data; the
//! accessors at the bottom of [`EntryDetail`] read and write those overlays
//! without changing the wire layout.

use serde::{Deserialize, Serialize};

use super::{
    Addenda, Addenda02, Addenda05, Addenda98, Addenda98Refused, Addenda99, Addenda99Contested,
    Addenda99Dishonored, AddendaRecord, AddendaTag, FixedWidthRecord,
    codes::{self, Direction},
};
use crate::{
    codec::{
        FieldCursor, LineBuilder, check_alpha, check_digit, check_digits, check_max,
        check_required_alpha, encode_alpha, hash_component,
    },
    error::{Error, FieldError, FieldErrorKind, Result},
    opts::ValidateOpts,
};

/// What an entry is: a payment, a return of one, or a notification of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Forward,
    Return,
    #[serde(rename = "NOC")]
    Noc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryDetail {
    /// Opaque identifier for callers; never written to the file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub transaction_code: u8,
    /// First 8 digits of the receiving DFI routing number.
    #[serde(rename = "RDFIIdentification")]
    pub rdfi_identification: String,
    pub check_digit: u8,
    #[serde(rename = "DFIAccountNumber")]
    pub dfi_account_number: String,
    /// Minor currency units.
    pub amount: u64,
    pub identification_number: String,
    pub individual_name: String,
    pub discretionary_data: String,
    pub addenda_record_indicator: u8,
    /// ODFI routing prefix followed by a 7-digit sequence.
    pub trace_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub addenda02: Option<Addenda02>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addenda05: Vec<Addenda05>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addenda98: Option<Addenda98>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addenda98_refused: Option<Addenda98Refused>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addenda99: Option<Addenda99>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addenda99_contested: Option<Addenda99Contested>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addenda99_dishonored: Option<Addenda99Dishonored>,
}

impl Default for EntryDetail {
    fn default() -> Self {
        Self {
            id: String::new(),
            transaction_code: codes::CHECKING_CREDIT,
            rdfi_identification: String::new(),
            check_digit: 0,
            dfi_account_number: String::new(),
            amount: 0,
            identification_number: String::new(),
            individual_name: String::new(),
            discretionary_data: String::new(),
            addenda_record_indicator: 0,
            trace_number: String::new(),
            addenda02: None,
            addenda05: Vec::new(),
            addenda98: None,
            addenda98_refused: None,
            addenda99: None,
            addenda99_contested: None,
            addenda99_dishonored: None,
        }
    }
}

impl EntryDetail {
    /// Entry to the account at `routing` (8 or 9 digits).
    #[must_use]
    pub fn new(transaction_code: u8, routing: &str, account: &str, amount: u64) -> Self {
        let mut entry = Self {
            transaction_code,
            dfi_account_number: account.to_string(),
            amount,
            ..Self::default()
        };
        entry.set_rdfi(routing);
        entry
    }

    /// Splits a 9-digit routing number into RDFI identification and check
    /// digit. An 8-digit prefix gets its check digit computed.
    pub fn set_rdfi(&mut self, routing: &str) {
        (self.rdfi_identification, self.check_digit) = split_routing(routing);
    }

    #[must_use]
    pub fn category(&self) -> Category {
        if self.addenda99.is_some()
            || self.addenda99_contested.is_some()
            || self.addenda99_dishonored.is_some()
        {
            Category::Return
        } else if self.addenda98.is_some() || self.addenda98_refused.is_some() {
            Category::Noc
        } else {
            Category::Forward
        }
    }

    /// Credit or debit, `None` for codes outside the tables.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        codes::direction(self.transaction_code)
    }

    /// Contribution of this entry to the batch entry hash.
    #[must_use]
    pub fn hash_component(&self) -> u64 {
        hash_component(&self.rdfi_identification)
    }

    /// Sequence part of the trace number (its last 7 digits).
    #[must_use]
    pub fn trace_sequence(&self) -> u32 {
        let len = self.trace_number.len();
        self.trace_number.get(len.saturating_sub(7)..).and_then(|s| s.parse().ok()).unwrap_or(0)
    }

    /// Attaches a standard addenda record to its slot.
    ///
    /// Fails with the tag of the record when the slot is already taken or the
    /// record is an IAT leg.
    pub fn add_addenda(&mut self, addenda: Addenda) -> std::result::Result<(), AddendaTag> {
        fn place<T>(
            slot: &mut Option<T>,
            value: T,
            tag: AddendaTag,
        ) -> std::result::Result<(), AddendaTag> {
            if slot.is_some() {
                return Err(tag);
            }
            *slot = Some(value);
            Ok(())
        }

        let tag = addenda.tag();
        match addenda {
            Addenda::Addenda02(a) => place(&mut self.addenda02, a, tag),
            Addenda::Addenda05(a) => {
                self.addenda05.push(a);
                Ok(())
            }
            Addenda::Addenda98(a) => place(&mut self.addenda98, a, tag),
            Addenda::Addenda98Refused(a) => place(&mut self.addenda98_refused, a, tag),
            Addenda::Addenda99(a) => place(&mut self.addenda99, a, tag),
            Addenda::Addenda99Contested(a) => place(&mut self.addenda99_contested, a, tag),
            Addenda::Addenda99Dishonored(a) => place(&mut self.addenda99_dishonored, a, tag),
            _ => Err(tag),
        }
    }

    /// Attached addenda in the order they are written.
    #[must_use]
    pub fn addenda_records(&self) -> Vec<&dyn AddendaRecord> {
        let mut records: Vec<&dyn AddendaRecord> = Vec::with_capacity(self.addenda_count());
        if let Some(a) = &self.addenda02 {
            records.push(a);
        }
        records.extend(self.addenda05.iter().map(|a| a as &dyn AddendaRecord));
        if let Some(a) = &self.addenda98 {
            records.push(a);
        }
        if let Some(a) = &self.addenda98_refused {
            records.push(a);
        }
        if let Some(a) = &self.addenda99 {
            records.push(a);
        }
        if let Some(a) = &self.addenda99_contested {
            records.push(a);
        }
        if let Some(a) = &self.addenda99_dishonored {
            records.push(a);
        }
        records
    }

    #[must_use]
    pub fn addenda_count(&self) -> usize {
        self.addenda05.len()
            + usize::from(self.addenda02.is_some())
            + usize::from(self.addenda98.is_some())
            + usize::from(self.addenda98_refused.is_some())
            + usize::from(self.addenda99.is_some())
            + usize::from(self.addenda99_contested.is_some())
            + usize::from(self.addenda99_dishonored.is_some())
    }

    /// Fills in the fields of attached addenda that derive from the entry:
    /// sequence numbers, trace numbers and the addenda record indicator.
    pub(crate) fn sync_addenda(&mut self) {
        let entry_sequence = self.trace_sequence();
        for (i, addenda) in self.addenda05.iter_mut().enumerate() {
            addenda.sequence_number = u16::try_from(i + 1).unwrap_or(u16::MAX);
            addenda.entry_detail_sequence_number = entry_sequence;
        }
        let trace = &self.trace_number;
        if let Some(a) = &mut self.addenda02 {
            a.trace_number.clone_from(trace);
        }
        if let Some(a) = &mut self.addenda98 {
            a.trace_number.clone_from(trace);
        }
        if let Some(a) = &mut self.addenda98_refused {
            a.trace_number.clone_from(trace);
        }
        if let Some(a) = &mut self.addenda99 {
            a.trace_number.clone_from(trace);
        }
        if let Some(a) = &mut self.addenda99_contested {
            a.trace_number.clone_from(trace);
        }
        if let Some(a) = &mut self.addenda99_dishonored {
            a.trace_number.clone_from(trace);
        }
        self.addenda_record_indicator = u8::from(self.addenda_count() > 0);
    }

    /// Field checks of the entry itself.
    pub fn validate_fields(&self, opts: &ValidateOpts) -> std::result::Result<(), FieldError> {
        if !codes::is_entry_transaction_code(self.transaction_code) {
            return Err(FieldError::new(
                "transactionCode",
                self.transaction_code.to_string(),
                FieldErrorKind::InvalidCode,
            ));
        }
        check_digits("RDFIIdentification", &self.rdfi_identification, 8)?;
        if !opts.allow_invalid_check_digit {
            let expected = check_digit(&self.rdfi_identification)?;
            if expected != self.check_digit {
                return Err(FieldError::new(
                    "checkDigit",
                    self.check_digit.to_string(),
                    FieldErrorKind::CheckDigit { expected },
                ));
            }
        }
        check_required_alpha("DFIAccountNumber", &self.dfi_account_number, 17)?;
        check_max("amount", self.amount, 10)?;
        let zero_required = codes::is_prenote(self.transaction_code)
            || codes::is_zero_dollar(self.transaction_code);
        if zero_required && self.amount != 0 && !opts.allow_invalid_amounts {
            return Err(FieldError::new("amount", self.amount.to_string(), FieldErrorKind::Invalid));
        }
        check_alpha("identificationNumber", &self.identification_number, 15)?;
        check_alpha("individualName", &self.individual_name, 22)?;
        check_alpha("discretionaryData", &self.discretionary_data, 2)?;
        if self.addenda_record_indicator > 1 {
            return Err(FieldError::new(
                "addendaRecordIndicator",
                self.addenda_record_indicator.to_string(),
                FieldErrorKind::InvalidCode,
            ));
        }
        check_digits("traceNumber", &self.trace_number, 15)
    }

    /// Checks the entry and every attached addenda. Error paths are relative
    /// to the entry (`addenda05[1]`).
    pub fn validate(&self, opts: &ValidateOpts) -> Result<()> {
        self.validate_fields(opts).map_err(|e| Error::field("", e))?;
        if let Some(a) = &self.addenda02 {
            a.validate(opts).map_err(|e| Error::field("addenda02", e))?;
        }
        for (i, a) in self.addenda05.iter().enumerate() {
            a.validate(opts).map_err(|e| Error::field(format!("addenda05[{i}]"), e))?;
        }
        if let Some(a) = &self.addenda98 {
            a.validate(opts).map_err(|e| Error::field("addenda98", e))?;
        }
        if let Some(a) = &self.addenda98_refused {
            a.validate(opts).map_err(|e| Error::field("addenda98Refused", e))?;
        }
        if let Some(a) = &self.addenda99 {
            a.validate(opts).map_err(|e| Error::field("addenda99", e))?;
        }
        if let Some(a) = &self.addenda99_contested {
            a.validate(opts).map_err(|e| Error::field("addenda99Contested", e))?;
        }
        if let Some(a) = &self.addenda99_dishonored {
            a.validate(opts).map_err(|e| Error::field("addenda99Dishonored", e))?;
        }
        Ok(())
    }

    // ========================================================================
    // SEC overlays
    // ========================================================================

    fn padded_name(&self) -> String {
        encode_alpha(&self.individual_name, 22)
    }

    /// CTX/ATX/TRX: number of addenda records announced in columns 55-58.
    #[must_use]
    pub fn catx_addenda_records(&self) -> Option<u16> {
        self.padded_name().get(..4).and_then(|s| s.parse().ok())
    }

    /// CTX/ATX/TRX: receiving company name in columns 59-74.
    #[must_use]
    pub fn catx_receiving_company(&self) -> String {
        self.padded_name().get(4..20).unwrap_or("").trim_end().to_string()
    }

    pub fn set_catx_addenda_records(&mut self, count: u16) {
        let company = self.catx_receiving_company();
        self.individual_name = format!("{count:04}{}", encode_alpha(&company, 16));
    }

    pub fn set_catx_receiving_company(&mut self, company: &str) {
        let count = self.padded_name().get(..4).unwrap_or("0000").to_string();
        self.individual_name = format!("{count}{}", encode_alpha(company, 16));
    }

    /// ARC, BOC, RCK, XCK, TRC: serial number of the converted check.
    #[must_use]
    pub fn check_serial_number(&self) -> &str {
        self.identification_number.trim_end()
    }

    pub fn set_check_serial_number(&mut self, serial: &str) {
        self.identification_number = serial.to_string();
    }

    fn padded_identification(&self) -> String {
        encode_alpha(&self.identification_number, 15)
    }

    /// POP: check serial number, columns 40-48.
    #[must_use]
    pub fn pop_check_serial_number(&self) -> String {
        self.padded_identification().get(..9).unwrap_or("").trim_end().to_string()
    }

    /// POP: terminal city abbreviation, columns 49-52.
    #[must_use]
    pub fn pop_terminal_city(&self) -> String {
        self.padded_identification().get(9..13).unwrap_or("").trim_end().to_string()
    }

    /// POP: terminal state, columns 53-54.
    #[must_use]
    pub fn pop_terminal_state(&self) -> String {
        self.padded_identification().get(13..15).unwrap_or("").trim_end().to_string()
    }

    pub fn set_pop_fields(&mut self, serial: &str, city: &str, state: &str) {
        let fields =
            [encode_alpha(serial, 9), encode_alpha(city, 4), encode_alpha(state, 2)].concat();
        self.identification_number = fields.trim_end().to_string();
    }

    /// SHR: card expiration date (`MMYY`), columns 40-43.
    #[must_use]
    pub fn shr_card_expiration_date(&self) -> String {
        self.padded_identification().get(..4).unwrap_or("").to_string()
    }

    /// SHR: document reference number, columns 44-54.
    #[must_use]
    pub fn shr_document_reference_number(&self) -> String {
        self.padded_identification().get(4..15).unwrap_or("").trim_end().to_string()
    }

    pub fn set_shr_fields(&mut self, card_expiration: &str, document_reference: &str) {
        self.identification_number =
            format!("{}{}", encode_alpha(card_expiration, 4), encode_alpha(document_reference, 11))
                .trim_end()
                .to_string();
    }

    /// POS, MTE, SHR: card transaction type code, columns 77-78.
    #[must_use]
    pub fn card_transaction_type(&self) -> &str {
        &self.discretionary_data
    }

    /// WEB, TEL: payment type code (`R` recurring, `S` single).
    #[must_use]
    pub fn payment_type_code(&self) -> &str {
        self.discretionary_data.trim_end()
    }
}

/// RDFI identification and check digit of an 8 or 9 digit routing number.
pub(crate) fn split_routing(routing: &str) -> (String, u8) {
    let prefix: String = routing.chars().take(8).collect();
    let digit = match routing.as_bytes().get(8) {
        Some(digit) if digit.is_ascii_digit() => digit - b'0',
        _ => check_digit(&prefix).unwrap_or(0),
    };
    (prefix, digit)
}

impl FixedWidthRecord for EntryDetail {
    fn decode(cursor: &mut FieldCursor<'_>) -> std::result::Result<Self, FieldError> {
        Ok(Self {
            transaction_code: cursor.small("transactionCode", 2)?,
            rdfi_identification: cursor.digits("RDFIIdentification", 8)?,
            check_digit: cursor.small("checkDigit", 1)?,
            dfi_account_number: cursor.alpha("DFIAccountNumber", 17)?,
            amount: cursor.numeric("amount", 10)?,
            identification_number: cursor.alpha("identificationNumber", 15)?,
            individual_name: cursor.alpha("individualName", 22)?,
            discretionary_data: cursor.alpha("discretionaryData", 2)?,
            addenda_record_indicator: cursor.small("addendaRecordIndicator", 1)?,
            trace_number: cursor.digits("traceNumber", 15)?,
            ..Self::default()
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('6')
            .numeric(self.transaction_code.into(), 2)
            .digits(&self.rdfi_identification, 8)
            .numeric(self.check_digit.into(), 1)
            .alpha(&self.dfi_account_number, 17)
            .numeric(self.amount, 10)
            .alpha(&self.identification_number, 15)
            .alpha(&self.individual_name, 22)
            .alpha(&self.discretionary_data, 2)
            .numeric(self.addenda_record_indicator.into(), 1)
            .digits(&self.trace_number, 15)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str =
        "62223138010412345678         0100000000               Receiver Account Name   0121042880000001";

    fn sample() -> EntryDetail {
        EntryDetail {
            individual_name: "Receiver Account Name".to_string(),
            trace_number: "121042880000001".to_string(),
            ..EntryDetail::new(codes::CHECKING_CREDIT, "231380104", "12345678", 100_000_000)
        }
    }

    #[test]
    fn test_parse_and_encode() {
        assert_eq!(LINE.len(), 94);
        assert_eq!(EntryDetail::parse(LINE).unwrap(), sample());
        assert_eq!(sample().to_line(), LINE);
    }

    #[test]
    fn test_set_rdfi() {
        let mut entry = EntryDetail::default();
        entry.set_rdfi("23138010");
        assert_eq!((entry.rdfi_identification.as_str(), entry.check_digit), ("23138010", 4));
        entry.set_rdfi("121042882");
        assert_eq!((entry.rdfi_identification.as_str(), entry.check_digit), ("12104288", 2));
    }

    #[test]
    fn test_validate_fields() {
        let opts = ValidateOpts::default();
        assert!(sample().validate(&opts).is_ok());

        let bad_code = EntryDetail { transaction_code: 25, ..sample() };
        assert_eq!(bad_code.validate_fields(&opts).unwrap_err().field, "transactionCode");

        let bad_digit = EntryDetail { check_digit: 5, ..sample() };
        let err = bad_digit.validate_fields(&opts).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::CheckDigit { expected: 4 });
        let relaxed = ValidateOpts { allow_invalid_check_digit: true, ..opts };
        assert!(bad_digit.validate_fields(&relaxed).is_ok());

        let prenote =
            EntryDetail { transaction_code: codes::CHECKING_PRENOTE_CREDIT, amount: 1, ..sample() };
        assert_eq!(prenote.validate_fields(&opts).unwrap_err().field, "amount");

        let huge = EntryDetail { amount: 10_000_000_000, ..sample() };
        let err = huge.validate_fields(&opts).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::TooLong { max: 10 });
    }

    #[test]
    fn test_addenda_slots() {
        let mut entry = sample();
        assert!(entry.add_addenda(Addenda::Addenda05(Addenda05::new("one"))).is_ok());
        assert!(entry.add_addenda(Addenda::Addenda05(Addenda05::new("two"))).is_ok());
        assert!(entry.add_addenda(Addenda::Addenda99(Addenda99::default())).is_ok());
        assert_eq!(
            entry.add_addenda(Addenda::Addenda99(Addenda99::default())),
            Err(AddendaTag::Addenda99)
        );
        assert_eq!(entry.addenda_count(), 3);
        assert_eq!(entry.category(), Category::Return);

        let tags: Vec<_> = entry.addenda_records().iter().map(|a| a.tag()).collect();
        assert_eq!(tags, [AddendaTag::Addenda05, AddendaTag::Addenda05, AddendaTag::Addenda99]);
    }

    #[test]
    fn test_sync_addenda() {
        let mut entry = sample();
        entry.addenda05 = vec![Addenda05::new("one"), Addenda05::new("two")];
        entry.addenda99 = Some(Addenda99::default());
        entry.sync_addenda();
        assert_eq!(entry.addenda_record_indicator, 1);
        assert_eq!(entry.addenda05[1].sequence_number, 2);
        assert_eq!(entry.addenda05[1].entry_detail_sequence_number, 1);
        assert_eq!(entry.addenda99.as_ref().unwrap().trace_number, "121042880000001");
    }

    #[test]
    fn test_addenda_errors_carry_path() {
        let mut entry = sample();
        entry.addenda05 = vec![Addenda05::new("ok"), Addenda05::new(&"x".repeat(81))];
        entry.sync_addenda();
        let err = entry.validate(&ValidateOpts::default()).unwrap_err();
        assert_eq!(err.path(), Some("addenda05[1]"));
    }

    #[test]
    fn test_catx_overlay() {
        let mut entry = sample();
        entry.set_catx_receiving_company("Receiver Company");
        entry.set_catx_addenda_records(2);
        assert_eq!(entry.individual_name, "0002Receiver Company");
        assert_eq!(entry.catx_addenda_records(), Some(2));
        assert_eq!(entry.catx_receiving_company(), "Receiver Company");
    }

    #[test]
    fn test_pop_and_shr_overlays() {
        let mut entry = sample();
        entry.set_pop_fields("123456", "PHIL", "PA");
        assert_eq!(entry.identification_number, "123456   PHILPA");
        assert_eq!(entry.pop_check_serial_number(), "123456");
        assert_eq!(entry.pop_terminal_city(), "PHIL");
        assert_eq!(entry.pop_terminal_state(), "PA");

        entry.set_shr_fields("0722", "12345678910");
        assert_eq!(entry.shr_card_expiration_date(), "0722");
        assert_eq!(entry.shr_document_reference_number(), "12345678910");
    }

    #[test]
    fn test_trace_sequence() {
        assert_eq!(sample().trace_sequence(), 1);
        assert_eq!(EntryDetail::default().trace_sequence(), 0);
    }
}
