//! Terminal (`02`) and payment related information (`05`) addenda.

use serde::{Deserialize, Serialize};

use super::{AddendaRecord, AddendaTag, check_sequence, check_trace, expect_type};
use crate::{
    codec::{
        FieldCursor, LineBuilder, check_alpha, check_max, check_month_day, check_required_alpha,
    },
    error::FieldError,
    opts::ValidateOpts,
    record::{FixedWidthRecord, file_control::narrow},
};

/// Point-of-sale terminal information for MTE, POS and SHR entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Addenda02 {
    pub reference_information_one: String,
    pub reference_information_two: String,
    pub terminal_identification_code: String,
    pub transaction_serial_number: String,
    /// `MMDD`
    pub transaction_date: String,
    pub authorization_code_or_expire_date: String,
    pub terminal_location: String,
    pub terminal_city: String,
    pub terminal_state: String,
    /// Trace number of the owning entry.
    pub trace_number: String,
}

impl AddendaRecord for Addenda02 {
    fn tag(&self) -> AddendaTag {
        AddendaTag::Addenda02
    }

    fn validate(&self, _opts: &ValidateOpts) -> Result<(), FieldError> {
        check_alpha("referenceInformationOne", &self.reference_information_one, 7)?;
        check_alpha("referenceInformationTwo", &self.reference_information_two, 3)?;
        check_required_alpha("terminalIdentificationCode", &self.terminal_identification_code, 6)?;
        check_required_alpha("transactionSerialNumber", &self.transaction_serial_number, 6)?;
        check_month_day("transactionDate", &self.transaction_date)?;
        check_alpha("authorizationCodeOrExpireDate", &self.authorization_code_or_expire_date, 6)?;
        check_required_alpha("terminalLocation", &self.terminal_location, 27)?;
        check_required_alpha("terminalCity", &self.terminal_city, 15)?;
        check_required_alpha("terminalState", &self.terminal_state, 2)?;
        check_trace("traceNumber", &self.trace_number)
    }
}

impl FixedWidthRecord for Addenda02 {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        expect_type(cursor, AddendaTag::Addenda02)?;
        Ok(Self {
            reference_information_one: cursor.alpha("referenceInformationOne", 7)?,
            reference_information_two: cursor.alpha("referenceInformationTwo", 3)?,
            terminal_identification_code: cursor.alpha("terminalIdentificationCode", 6)?,
            transaction_serial_number: cursor.alpha("transactionSerialNumber", 6)?,
            transaction_date: cursor.alpha("transactionDate", 4)?,
            authorization_code_or_expire_date: cursor.alpha("authorizationCodeOrExpireDate", 6)?,
            terminal_location: cursor.alpha("terminalLocation", 27)?,
            terminal_city: cursor.alpha("terminalCity", 15)?,
            terminal_state: cursor.alpha("terminalState", 2)?,
            trace_number: cursor.digits("traceNumber", 15)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('7')
            .literal(AddendaTag::Addenda02.type_code())
            .alpha(&self.reference_information_one, 7)
            .alpha(&self.reference_information_two, 3)
            .alpha(&self.terminal_identification_code, 6)
            .alpha(&self.transaction_serial_number, 6)
            .alpha(&self.transaction_date, 4)
            .alpha(&self.authorization_code_or_expire_date, 6)
            .alpha(&self.terminal_location, 27)
            .alpha(&self.terminal_city, 15)
            .alpha(&self.terminal_state, 2)
            .digits(&self.trace_number, 15)
            .finish()
    }
}

/// Free-form payment related information, up to 80 characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Addenda05 {
    pub payment_related_information: String,
    /// 1-based position among the entry's `05` records.
    pub sequence_number: u16,
    /// Last 7 digits of the owning entry's trace number.
    pub entry_detail_sequence_number: u32,
}

impl Addenda05 {
    #[must_use]
    pub fn new(payment_related_information: &str) -> Self {
        Self {
            payment_related_information: payment_related_information.to_string(),
            ..Self::default()
        }
    }
}

impl AddendaRecord for Addenda05 {
    fn tag(&self) -> AddendaTag {
        AddendaTag::Addenda05
    }

    fn validate(&self, _opts: &ValidateOpts) -> Result<(), FieldError> {
        check_alpha("paymentRelatedInformation", &self.payment_related_information, 80)?;
        check_sequence("sequenceNumber", self.sequence_number.into())?;
        check_max("sequenceNumber", self.sequence_number.into(), 4)?;
        check_sequence("entryDetailSequenceNumber", self.entry_detail_sequence_number.into())?;
        check_max("entryDetailSequenceNumber", self.entry_detail_sequence_number.into(), 7)
    }
}

impl FixedWidthRecord for Addenda05 {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        expect_type(cursor, AddendaTag::Addenda05)?;
        let payment_related_information = cursor.alpha("paymentRelatedInformation", 80)?;
        let sequence_number = cursor.numeric("sequenceNumber", 4)?;
        let entry_detail_sequence_number = cursor.numeric("entryDetailSequenceNumber", 7)?;
        Ok(Self {
            payment_related_information,
            sequence_number: u16::try_from(sequence_number).unwrap_or(u16::MAX),
            entry_detail_sequence_number: narrow(
                "entryDetailSequenceNumber",
                entry_detail_sequence_number,
            )?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('7')
            .literal(AddendaTag::Addenda05.type_code())
            .alpha(&self.payment_related_information, 80)
            .numeric(self.sequence_number.into(), 4)
            .numeric(self.entry_detail_sequence_number.into(), 7)
            .finish()
    }
}
