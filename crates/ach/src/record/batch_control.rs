//! Batch Control record (`8`) and its ADV variant.

use serde::{Deserialize, Serialize};

use super::{FixedWidthRecord, batch_header::check_service_class, codes, file_control::narrow};
use crate::{
    codec::{FieldCursor, LineBuilder, check_alpha, check_digits, check_max},
    error::FieldError,
    opts::ValidateOpts,
};

/// Closes a batch with counts and totals over its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchControl {
    pub service_class_code: u16,
    /// Entries plus their addenda records.
    pub entry_addenda_count: u32,
    /// Sum of the RDFI identifications, modulo 10^10.
    pub entry_hash: u64,
    pub total_debit_entry_dollar_amount: u64,
    pub total_credit_entry_dollar_amount: u64,
    pub company_identification: String,
    pub message_authentication_code: String,
    #[serde(rename = "ODFIIdentification")]
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl Default for BatchControl {
    fn default() -> Self {
        Self {
            service_class_code: codes::MIXED_DEBITS_AND_CREDITS,
            entry_addenda_count: 0,
            entry_hash: 0,
            total_debit_entry_dollar_amount: 0,
            total_credit_entry_dollar_amount: 0,
            company_identification: String::new(),
            message_authentication_code: String::new(),
            odfi_identification: String::new(),
            batch_number: 1,
        }
    }
}

impl BatchControl {
    pub fn validate(&self, _opts: &ValidateOpts) -> Result<(), FieldError> {
        check_service_class(self.service_class_code)?;
        check_max("entryAddendaCount", self.entry_addenda_count.into(), 6)?;
        check_max("entryHash", self.entry_hash, 10)?;
        check_max("totalDebitEntryDollarAmount", self.total_debit_entry_dollar_amount, 12)?;
        check_max("totalCreditEntryDollarAmount", self.total_credit_entry_dollar_amount, 12)?;
        check_alpha("companyIdentification", &self.company_identification, 10)?;
        check_alpha("messageAuthenticationCode", &self.message_authentication_code, 19)?;
        check_digits("ODFIIdentification", &self.odfi_identification, 8)?;
        check_max("batchNumber", self.batch_number.into(), 7)
    }
}

impl FixedWidthRecord for BatchControl {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        let service_class_code = cursor.numeric("serviceClassCode", 3)?;
        let entry_addenda_count = cursor.numeric("entryAddendaCount", 6)?;
        let entry_hash = cursor.numeric("entryHash", 10)?;
        let total_debit_entry_dollar_amount = cursor.numeric("totalDebitEntryDollarAmount", 12)?;
        let total_credit_entry_dollar_amount = cursor.numeric("totalCreditEntryDollarAmount", 12)?;
        let company_identification = cursor.alpha("companyIdentification", 10)?;
        let message_authentication_code = cursor.alpha("messageAuthenticationCode", 19)?;
        cursor.skip(6);
        Ok(Self {
            service_class_code: u16::try_from(service_class_code).unwrap_or(u16::MAX),
            entry_addenda_count: narrow("entryAddendaCount", entry_addenda_count)?,
            entry_hash,
            total_debit_entry_dollar_amount,
            total_credit_entry_dollar_amount,
            company_identification,
            message_authentication_code,
            odfi_identification: cursor.digits("ODFIIdentification", 8)?,
            batch_number: narrow("batchNumber", cursor.numeric("batchNumber", 7)?)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('8')
            .numeric(self.service_class_code.into(), 3)
            .numeric(self.entry_addenda_count.into(), 6)
            .numeric(self.entry_hash, 10)
            .numeric(self.total_debit_entry_dollar_amount, 12)
            .numeric(self.total_credit_entry_dollar_amount, 12)
            .alpha(&self.company_identification, 10)
            .alpha(&self.message_authentication_code, 19)
            .blank(6)
            .digits(&self.odfi_identification, 8)
            .numeric(self.batch_number.into(), 7)
            .finish()
    }
}

/// Batch Control of ADV batches, with 20-digit totals and no company identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvBatchControl {
    pub service_class_code: u16,
    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit_entry_dollar_amount: u64,
    pub total_credit_entry_dollar_amount: u64,
    pub ach_operator_data: String,
    #[serde(rename = "ODFIIdentification")]
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl Default for AdvBatchControl {
    fn default() -> Self {
        Self {
            service_class_code: codes::AUTOMATED_ACCOUNTING_ADVICES,
            entry_addenda_count: 0,
            entry_hash: 0,
            total_debit_entry_dollar_amount: 0,
            total_credit_entry_dollar_amount: 0,
            ach_operator_data: String::new(),
            odfi_identification: String::new(),
            batch_number: 1,
        }
    }
}

impl AdvBatchControl {
    pub fn validate(&self, _opts: &ValidateOpts) -> Result<(), FieldError> {
        check_service_class(self.service_class_code)?;
        check_max("entryAddendaCount", self.entry_addenda_count.into(), 6)?;
        check_max("entryHash", self.entry_hash, 10)?;
        check_alpha("achOperatorData", &self.ach_operator_data, 19)?;
        check_digits("ODFIIdentification", &self.odfi_identification, 8)?;
        check_max("batchNumber", self.batch_number.into(), 7)
    }
}

impl FixedWidthRecord for AdvBatchControl {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        let service_class_code = cursor.numeric("serviceClassCode", 3)?;
        let entry_addenda_count = cursor.numeric("entryAddendaCount", 6)?;
        Ok(Self {
            service_class_code: u16::try_from(service_class_code).unwrap_or(u16::MAX),
            entry_addenda_count: narrow("entryAddendaCount", entry_addenda_count)?,
            entry_hash: cursor.numeric("entryHash", 10)?,
            total_debit_entry_dollar_amount: cursor.numeric("totalDebitEntryDollarAmount", 20)?,
            total_credit_entry_dollar_amount: cursor.numeric("totalCreditEntryDollarAmount", 20)?,
            ach_operator_data: cursor.alpha("achOperatorData", 19)?,
            odfi_identification: cursor.digits("ODFIIdentification", 8)?,
            batch_number: narrow("batchNumber", cursor.numeric("batchNumber", 7)?)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('8')
            .numeric(self.service_class_code.into(), 3)
            .numeric(self.entry_addenda_count.into(), 6)
            .numeric(self.entry_hash, 10)
            .numeric(self.total_debit_entry_dollar_amount, 20)
            .numeric(self.total_credit_entry_dollar_amount, 20)
            .alpha(&self.ach_operator_data, 19)
            .digits(&self.odfi_identification, 8)
            .numeric(self.batch_number.into(), 7)
            .finish()
    }
}
