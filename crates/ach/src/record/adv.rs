//! Entry Detail record of ADV (automated accounting advice) batches.

use serde::{Deserialize, Serialize};

use super::{
    FixedWidthRecord,
    codes::{self, Direction},
};
use crate::{
    codec::{
        FieldCursor, LineBuilder, check_alpha, check_digit, check_digits, check_max,
        check_required_alpha, hash_component,
    },
    error::{FieldError, FieldErrorKind},
    opts::ValidateOpts,
};

/// Accounting advice sent by an ACH operator to a financial institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvEntryDetail {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// `81`..`88`
    pub transaction_code: u8,
    #[serde(rename = "RDFIIdentification")]
    pub rdfi_identification: String,
    pub check_digit: u8,
    #[serde(rename = "DFIAccountNumber")]
    pub dfi_account_number: String,
    pub amount: u64,
    pub advice_routing_number: String,
    pub file_identification: String,
    #[serde(rename = "achOperatorData")]
    pub ach_operator_data: String,
    pub individual_name: String,
    pub discretionary_data: String,
    pub addenda_record_indicator: u8,
    #[serde(rename = "achOperatorRoutingNumber")]
    pub ach_operator_routing_number: String,
    /// Day of the year the advice was created.
    pub julian_day: String,
    pub sequence_number: u16,
}

impl Default for AdvEntryDetail {
    fn default() -> Self {
        Self {
            id: String::new(),
            transaction_code: codes::CREDIT_FOR_DEBITS_ORIGINATED,
            rdfi_identification: String::new(),
            check_digit: 0,
            dfi_account_number: String::new(),
            amount: 0,
            advice_routing_number: String::new(),
            file_identification: String::new(),
            ach_operator_data: String::new(),
            individual_name: String::new(),
            discretionary_data: String::new(),
            addenda_record_indicator: 0,
            ach_operator_routing_number: String::new(),
            julian_day: String::new(),
            sequence_number: 0,
        }
    }
}

impl AdvEntryDetail {
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        codes::direction(self.transaction_code)
    }

    #[must_use]
    pub fn hash_component(&self) -> u64 {
        hash_component(&self.rdfi_identification)
    }

    pub fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError> {
        if !codes::is_adv_transaction_code(self.transaction_code) {
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
        check_required_alpha("DFIAccountNumber", &self.dfi_account_number, 15)?;
        check_max("amount", self.amount, 12)?;
        check_digits("adviceRoutingNumber", &self.advice_routing_number, 9)?;
        check_alpha("fileIdentification", &self.file_identification, 5)?;
        check_alpha("achOperatorData", &self.ach_operator_data, 1)?;
        check_required_alpha("individualName", &self.individual_name, 22)?;
        check_alpha("discretionaryData", &self.discretionary_data, 2)?;
        if self.addenda_record_indicator != 0 {
            return Err(FieldError::new(
                "addendaRecordIndicator",
                self.addenda_record_indicator.to_string(),
                FieldErrorKind::InvalidCode,
            ));
        }
        check_digits("achOperatorRoutingNumber", &self.ach_operator_routing_number, 8)?;
        check_julian_day(&self.julian_day)?;
        check_max("sequenceNumber", self.sequence_number.into(), 4)
    }
}

fn check_julian_day(value: &str) -> Result<(), FieldError> {
    check_digits("julianDay", value, 3)?;
    match value.parse::<u16>() {
        Ok(1..=366) => Ok(()),
        _ => Err(FieldError::new("julianDay", value, FieldErrorKind::InvalidDate)),
    }
}

impl FixedWidthRecord for AdvEntryDetail {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        let transaction_code = cursor.small("transactionCode", 2)?;
        let rdfi_identification = cursor.digits("RDFIIdentification", 8)?;
        let check_digit = cursor.small("checkDigit", 1)?;
        let dfi_account_number = cursor.alpha("DFIAccountNumber", 15)?;
        let amount = cursor.numeric("amount", 12)?;
        let advice_routing_number = cursor.digits("adviceRoutingNumber", 9)?;
        let file_identification = cursor.alpha("fileIdentification", 5)?;
        let ach_operator_data = cursor.alpha("achOperatorData", 1)?;
        let individual_name = cursor.alpha("individualName", 22)?;
        let discretionary_data = cursor.alpha("discretionaryData", 2)?;
        let addenda_record_indicator = cursor.small("addendaRecordIndicator", 1)?;
        let ach_operator_routing_number = cursor.digits("achOperatorRoutingNumber", 8)?;
        let julian_day = cursor.digits("julianDay", 3)?;
        let sequence_number = cursor.numeric("sequenceNumber", 4)?;
        Ok(Self {
            id: String::new(),
            transaction_code,
            rdfi_identification,
            check_digit,
            dfi_account_number,
            amount,
            advice_routing_number,
            file_identification,
            ach_operator_data,
            individual_name,
            discretionary_data,
            addenda_record_indicator,
            ach_operator_routing_number,
            julian_day,
            sequence_number: u16::try_from(sequence_number).unwrap_or(u16::MAX),
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('6')
            .numeric(self.transaction_code.into(), 2)
            .digits(&self.rdfi_identification, 8)
            .numeric(self.check_digit.into(), 1)
            .alpha(&self.dfi_account_number, 15)
            .numeric(self.amount, 12)
            .digits(&self.advice_routing_number, 9)
            .alpha(&self.file_identification, 5)
            .alpha(&self.ach_operator_data, 1)
            .alpha(&self.individual_name, 22)
            .alpha(&self.discretionary_data, 2)
            .numeric(self.addenda_record_indicator.into(), 1)
            .digits(&self.ach_operator_routing_number, 8)
            .digits(&self.julian_day, 3)
            .numeric(self.sequence_number.into(), 4)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample() -> AdvEntryDetail {
        AdvEntryDetail {
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
            sequence_number: 1,
            ..AdvEntryDetail::default()
        }
    }

    #[test]
    fn test_roundtrip() {
        let line = sample().to_line();
        assert_eq!(line.len(), 94);
        assert!(line.starts_with("681231380104744-5678-99    000000050000121042882"));
        assert!(line.ends_with("011000010500001"));
        assert_eq!(AdvEntryDetail::parse(&line).unwrap(), sample());
    }

    #[test]
    fn test_validate() {
        let opts = ValidateOpts::default();
        assert!(sample().validate(&opts).is_ok());

        let standard_code = AdvEntryDetail { transaction_code: codes::CHECKING_CREDIT, ..sample() };
        assert_eq!(standard_code.validate(&opts).unwrap_err().field, "transactionCode");

        let bad_day = AdvEntryDetail { julian_day: "367".to_string(), ..sample() };
        assert_eq!(bad_day.validate(&opts).unwrap_err().field, "julianDay");

        assert_eq!(sample().direction(), Some(Direction::Credit));
    }
}
