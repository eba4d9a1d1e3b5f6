//! Batch Header record (`5`) of every batch except IAT.

use serde::{Deserialize, Serialize};

use super::{FixedWidthRecord, codes, file_control::narrow};
use crate::{
    codec::{
        FieldCursor, LineBuilder, check_alpha, check_digits, check_max, check_optional_date,
        check_required_alpha,
    },
    error::{FieldError, FieldErrorKind},
    opts::ValidateOpts,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchHeader {
    /// 200 mixed, 220 credits, 225 debits, 280 ADV.
    pub service_class_code: u16,
    pub company_name: String,
    pub company_discretionary_data: String,
    pub company_identification: String,
    pub standard_entry_class_code: String,
    /// Shown on the receiver's statement (`PAYROLL`, `REVERSAL`, ...).
    pub company_entry_description: String,
    pub company_descriptive_date: String,
    /// `YYMMDD`
    pub effective_entry_date: String,
    /// Julian day, filled in by the ACH operator.
    pub settlement_date: String,
    pub originator_status_code: u8,
    /// First 8 digits of the originating DFI routing number.
    #[serde(rename = "ODFIIdentification")]
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl Default for BatchHeader {
    fn default() -> Self {
        Self {
            service_class_code: codes::MIXED_DEBITS_AND_CREDITS,
            company_name: String::new(),
            company_discretionary_data: String::new(),
            company_identification: String::new(),
            standard_entry_class_code: String::new(),
            company_entry_description: String::new(),
            company_descriptive_date: String::new(),
            effective_entry_date: String::new(),
            settlement_date: String::new(),
            originator_status_code: 1,
            odfi_identification: String::new(),
            batch_number: 1,
        }
    }
}

impl BatchHeader {
    pub fn validate(&self, _opts: &ValidateOpts) -> Result<(), FieldError> {
        check_service_class(self.service_class_code)?;
        check_required_alpha("companyName", &self.company_name, 16)?;
        check_alpha("companyDiscretionaryData", &self.company_discretionary_data, 20)?;
        check_required_alpha("companyIdentification", &self.company_identification, 10)?;
        check_required_alpha("standardEntryClassCode", &self.standard_entry_class_code, 3)?;
        check_required_alpha("companyEntryDescription", &self.company_entry_description, 10)?;
        check_alpha("companyDescriptiveDate", &self.company_descriptive_date, 6)?;
        check_optional_date("effectiveEntryDate", &self.effective_entry_date)?;
        check_settlement_date(&self.settlement_date)?;
        check_originator_status(self.originator_status_code)?;
        check_digits("ODFIIdentification", &self.odfi_identification, 8)?;
        check_max("batchNumber", self.batch_number.into(), 7)
    }
}

pub(crate) fn check_service_class(code: u16) -> Result<(), FieldError> {
    if codes::is_service_class(code) {
        Ok(())
    } else {
        Err(FieldError::new("serviceClassCode", code.to_string(), FieldErrorKind::InvalidCode))
    }
}

pub(crate) fn check_settlement_date(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    check_digits("settlementDate", value, 3)
}

pub(crate) fn check_originator_status(code: u8) -> Result<(), FieldError> {
    if code <= 2 {
        Ok(())
    } else {
        Err(FieldError::new("originatorStatusCode", code.to_string(), FieldErrorKind::InvalidCode))
    }
}

impl FixedWidthRecord for BatchHeader {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        let service_class_code = cursor.numeric("serviceClassCode", 3)?;
        Ok(Self {
            service_class_code: u16::try_from(service_class_code).unwrap_or(u16::MAX),
            company_name: cursor.alpha("companyName", 16)?,
            company_discretionary_data: cursor.alpha("companyDiscretionaryData", 20)?,
            company_identification: cursor.alpha("companyIdentification", 10)?,
            standard_entry_class_code: cursor.alpha("standardEntryClassCode", 3)?,
            company_entry_description: cursor.alpha("companyEntryDescription", 10)?,
            company_descriptive_date: cursor.alpha("companyDescriptiveDate", 6)?,
            effective_entry_date: cursor.alpha("effectiveEntryDate", 6)?,
            settlement_date: cursor.alpha("settlementDate", 3)?,
            originator_status_code: cursor.small("originatorStatusCode", 1)?,
            odfi_identification: cursor.digits("ODFIIdentification", 8)?,
            batch_number: narrow("batchNumber", cursor.numeric("batchNumber", 7)?)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('5')
            .numeric(self.service_class_code.into(), 3)
            .alpha(&self.company_name, 16)
            .alpha(&self.company_discretionary_data, 20)
            .alpha(&self.company_identification, 10)
            .alpha(&self.standard_entry_class_code, 3)
            .alpha(&self.company_entry_description, 10)
            .alpha(&self.company_descriptive_date, 6)
            .alpha(&self.effective_entry_date, 6)
            .alpha(&self.settlement_date, 3)
            .numeric(self.originator_status_code.into(), 1)
            .digits(&self.odfi_identification, 8)
            .numeric(self.batch_number.into(), 7)
            .finish()
    }
}
