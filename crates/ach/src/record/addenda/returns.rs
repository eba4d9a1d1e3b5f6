//! Return addenda (`99`): plain returns, dishonored returns and contested dishonored returns.

use serde::{Deserialize, Serialize};

use super::{AddendaRecord, AddendaTag, check_dfi, check_reason_code, check_trace, expect_type};
use crate::{
    codec::{FieldCursor, LineBuilder, check_alpha, check_optional_date},
    error::{FieldError, FieldErrorKind},
    opts::ValidateOpts,
    record::{FixedWidthRecord, batch_header::check_settlement_date, codes},
};

/// Return of a forward entry by the RDFI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Addenda99 {
    pub return_code: String,
    pub original_trace: String,
    /// `YYMMDD`, only for death related returns.
    pub date_of_death: String,
    #[serde(rename = "originalDFI")]
    pub original_dfi: String,
    pub addenda_information: String,
    pub trace_number: String,
}

impl AddendaRecord for Addenda99 {
    fn tag(&self) -> AddendaTag {
        AddendaTag::Addenda99
    }

    fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError> {
        check_reason_code("returnCode", &self.return_code, codes::is_return_code, opts)?;
        check_trace("originalTrace", &self.original_trace)?;
        check_optional_date("dateOfDeath", &self.date_of_death)?;
        check_dfi("originalDFI", &self.original_dfi)?;
        check_alpha("addendaInformation", &self.addenda_information, 44)?;
        check_trace("traceNumber", &self.trace_number)
    }
}

impl FixedWidthRecord for Addenda99 {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        expect_type(cursor, AddendaTag::Addenda99)?;
        Ok(Self {
            return_code: cursor.alpha("returnCode", 3)?,
            original_trace: cursor.digits("originalTrace", 15)?,
            date_of_death: cursor.alpha("dateOfDeath", 6)?,
            original_dfi: cursor.digits("originalDFI", 8)?,
            addenda_information: cursor.alpha("addendaInformation", 44)?,
            trace_number: cursor.digits("traceNumber", 15)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('7')
            .literal(AddendaTag::Addenda99.type_code())
            .alpha(&self.return_code, 3)
            .digits(&self.original_trace, 15)
            .alpha(&self.date_of_death, 6)
            .digits(&self.original_dfi, 8)
            .alpha(&self.addenda_information, 44)
            .digits(&self.trace_number, 15)
            .finish()
    }
}

/// An ODFI dishonoring a return it received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Addenda99Dishonored {
    /// `R61`, `R67`..`R70`
    pub dishonored_return_reason_code: String,
    pub original_entry_trace_number: String,
    #[serde(rename = "originalReceivingDFIIdentification")]
    pub original_receiving_dfi_identification: String,
    pub return_trace_number: String,
    pub return_settlement_date: String,
    /// Two-digit numeric part of the original return reason code.
    pub return_reason_code: String,
    pub addenda_information: String,
    pub trace_number: String,
}

impl AddendaRecord for Addenda99Dishonored {
    fn tag(&self) -> AddendaTag {
        AddendaTag::Addenda99Dishonored
    }

    fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError> {
        check_reason_code(
            "dishonoredReturnReasonCode",
            &self.dishonored_return_reason_code,
            codes::is_dishonored_return_code,
            opts,
        )?;
        check_trace("originalEntryTraceNumber", &self.original_entry_trace_number)?;
        check_dfi(
            "originalReceivingDFIIdentification",
            &self.original_receiving_dfi_identification,
        )?;
        check_trace("returnTraceNumber", &self.return_trace_number)?;
        check_settlement_date(&self.return_settlement_date)
            .map_err(|err| FieldError { field: "returnSettlementDate", ..err })?;
        check_two_digits("returnReasonCode", &self.return_reason_code)?;
        check_alpha("addendaInformation", &self.addenda_information, 9)?;
        check_trace("traceNumber", &self.trace_number)
    }
}

impl FixedWidthRecord for Addenda99Dishonored {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        expect_type(cursor, AddendaTag::Addenda99Dishonored)?;
        let dishonored_return_reason_code = cursor.alpha("dishonoredReturnReasonCode", 3)?;
        let original_entry_trace_number = cursor.digits("originalEntryTraceNumber", 15)?;
        cursor.skip(6);
        let original_receiving_dfi_identification =
            cursor.digits("originalReceivingDFIIdentification", 8)?;
        cursor.skip(15);
        Ok(Self {
            dishonored_return_reason_code,
            original_entry_trace_number,
            original_receiving_dfi_identification,
            return_trace_number: cursor.digits("returnTraceNumber", 15)?,
            return_settlement_date: cursor.alpha("returnSettlementDate", 3)?,
            return_reason_code: cursor.alpha("returnReasonCode", 2)?,
            addenda_information: cursor.alpha("addendaInformation", 9)?,
            trace_number: cursor.digits("traceNumber", 15)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('7')
            .literal(AddendaTag::Addenda99Dishonored.type_code())
            .alpha(&self.dishonored_return_reason_code, 3)
            .digits(&self.original_entry_trace_number, 15)
            .blank(6)
            .digits(&self.original_receiving_dfi_identification, 8)
            .blank(15)
            .digits(&self.return_trace_number, 15)
            .alpha(&self.return_settlement_date, 3)
            .alpha(&self.return_reason_code, 2)
            .alpha(&self.addenda_information, 9)
            .digits(&self.trace_number, 15)
            .finish()
    }
}

/// An RDFI contesting a dishonored return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Addenda99Contested {
    /// `R71`..`R77`
    pub contested_return_code: String,
    pub original_entry_trace_number: String,
    pub date_original_entry_returned: String,
    #[serde(rename = "originalReceivingDFIIdentification")]
    pub original_receiving_dfi_identification: String,
    pub original_settlement_date: String,
    pub return_trace_number: String,
    pub return_settlement_date: String,
    pub return_reason_code: String,
    pub dishonored_return_trace_number: String,
    pub dishonored_return_settlement_date: String,
    pub dishonored_return_reason_code: String,
    pub trace_number: String,
}

impl AddendaRecord for Addenda99Contested {
    fn tag(&self) -> AddendaTag {
        AddendaTag::Addenda99Contested
    }

    fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError> {
        check_reason_code(
            "contestedReturnCode",
            &self.contested_return_code,
            codes::is_contested_return_code,
            opts,
        )?;
        check_trace("originalEntryTraceNumber", &self.original_entry_trace_number)?;
        check_optional_date("dateOriginalEntryReturned", &self.date_original_entry_returned)?;
        check_dfi(
            "originalReceivingDFIIdentification",
            &self.original_receiving_dfi_identification,
        )?;
        for (field, value) in [
            ("originalSettlementDate", &self.original_settlement_date),
            ("returnSettlementDate", &self.return_settlement_date),
            ("dishonoredReturnSettlementDate", &self.dishonored_return_settlement_date),
        ] {
            check_settlement_date(value).map_err(|err| FieldError { field, ..err })?;
        }
        check_trace("returnTraceNumber", &self.return_trace_number)?;
        check_two_digits("returnReasonCode", &self.return_reason_code)?;
        check_trace("dishonoredReturnTraceNumber", &self.dishonored_return_trace_number)?;
        check_two_digits("dishonoredReturnReasonCode", &self.dishonored_return_reason_code)?;
        check_trace("traceNumber", &self.trace_number)
    }
}

impl FixedWidthRecord for Addenda99Contested {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        expect_type(cursor, AddendaTag::Addenda99Contested)?;
        let mut record = Self {
            contested_return_code: cursor.alpha("contestedReturnCode", 3)?,
            original_entry_trace_number: cursor.digits("originalEntryTraceNumber", 15)?,
            date_original_entry_returned: cursor.alpha("dateOriginalEntryReturned", 6)?,
            original_receiving_dfi_identification: cursor
                .digits("originalReceivingDFIIdentification", 8)?,
            original_settlement_date: cursor.alpha("originalSettlementDate", 3)?,
            return_trace_number: cursor.digits("returnTraceNumber", 15)?,
            return_settlement_date: cursor.alpha("returnSettlementDate", 3)?,
            return_reason_code: cursor.alpha("returnReasonCode", 2)?,
            dishonored_return_trace_number: cursor.digits("dishonoredReturnTraceNumber", 15)?,
            dishonored_return_settlement_date: cursor
                .alpha("dishonoredReturnSettlementDate", 3)?,
            dishonored_return_reason_code: cursor.alpha("dishonoredReturnReasonCode", 2)?,
            trace_number: String::new(),
        };
        cursor.skip(1);
        record.trace_number = cursor.digits("traceNumber", 15)?;
        Ok(record)
    }

    fn to_line(&self) -> String {
        LineBuilder::new('7')
            .literal(AddendaTag::Addenda99Contested.type_code())
            .alpha(&self.contested_return_code, 3)
            .digits(&self.original_entry_trace_number, 15)
            .alpha(&self.date_original_entry_returned, 6)
            .digits(&self.original_receiving_dfi_identification, 8)
            .alpha(&self.original_settlement_date, 3)
            .digits(&self.return_trace_number, 15)
            .alpha(&self.return_settlement_date, 3)
            .alpha(&self.return_reason_code, 2)
            .digits(&self.dishonored_return_trace_number, 15)
            .alpha(&self.dishonored_return_settlement_date, 3)
            .alpha(&self.dishonored_return_reason_code, 2)
            .blank(1)
            .digits(&self.trace_number, 15)
            .finish()
    }
}

fn check_two_digits(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.len() == 2 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FieldError::new(field, value, FieldErrorKind::InvalidCode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Addenda;

    fn return_addenda() -> Addenda99 {
        Addenda99 {
            return_code: "R07".to_string(),
            original_trace: "121042880000001".to_string(),
            original_dfi: "23138010".to_string(),
            addenda_information: "Authorization revoked".to_string(),
            trace_number: "091012980000066".to_string(),
            ..Addenda99::default()
        }
    }

    #[test]
    fn test_addenda99_roundtrip() {
        let line = return_addenda().to_line();
        assert_eq!(line.len(), 94);
        assert!(line.starts_with("799R07121042880000001      23138010Authorization revoked"));
        assert_eq!(Addenda::parse(&line).unwrap(), Addenda::Addenda99(return_addenda()));
        assert!(return_addenda().validate(&ValidateOpts::default()).is_ok());
    }

    #[test]
    fn test_addenda99_checks() {
        let opts = ValidateOpts::default();
        let unknown = Addenda99 { return_code: "R60".to_string(), ..return_addenda() };
        assert_eq!(unknown.validate(&opts).unwrap_err().field, "returnCode");

        let death = Addenda99 { date_of_death: "190230".to_string(), ..return_addenda() };
        assert_eq!(death.validate(&opts).unwrap_err().field, "dateOfDeath");

        let no_dfi = Addenda99 { original_dfi: "00000000".to_string(), ..return_addenda() };
        let err = no_dfi.validate(&opts).unwrap_err();
        assert_eq!((err.field, err.kind), ("originalDFI", FieldErrorKind::Required));
    }

    #[test]
    fn test_dishonored_roundtrip() {
        let record = Addenda99Dishonored {
            dishonored_return_reason_code: "R68".to_string(),
            original_entry_trace_number: "121042880000001".to_string(),
            original_receiving_dfi_identification: "23138010".to_string(),
            return_trace_number: "231380100000001".to_string(),
            return_settlement_date: "179".to_string(),
            return_reason_code: "01".to_string(),
            addenda_information: "Untimely".to_string(),
            trace_number: "121042880000002".to_string(),
        };
        let line = record.to_line();
        assert_eq!(line.len(), 94);
        assert_eq!(Addenda::parse(&line).unwrap(), Addenda::Addenda99Dishonored(record.clone()));
        assert!(record.validate(&ValidateOpts::default()).is_ok());
    }

    #[test]
    fn test_contested_roundtrip() {
        let record = Addenda99Contested {
            contested_return_code: "R71".to_string(),
            original_entry_trace_number: "121042880000001".to_string(),
            date_original_entry_returned: "190816".to_string(),
            original_receiving_dfi_identification: "23138010".to_string(),
            original_settlement_date: "228".to_string(),
            return_trace_number: "231380100000001".to_string(),
            return_settlement_date: "229".to_string(),
            return_reason_code: "01".to_string(),
            dishonored_return_trace_number: "121042880000003".to_string(),
            dishonored_return_settlement_date: "230".to_string(),
            dishonored_return_reason_code: "69".to_string(),
            trace_number: "231380100000002".to_string(),
        };
        let line = record.to_line();
        assert_eq!(line.len(), 94);
        assert_eq!(Addenda::parse(&line).unwrap(), Addenda::Addenda99Contested(record.clone()));
        assert!(record.validate(&ValidateOpts::default()).is_ok());

        let bad = Addenda99Contested { return_reason_code: "1".to_string(), ..record };
        assert_eq!(bad.validate(&ValidateOpts::default()).unwrap_err().field, "returnReasonCode");
    }
}
