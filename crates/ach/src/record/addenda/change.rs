//! Notification of change addenda (`98`) and refused notifications of change.

use serde::{Deserialize, Serialize};

use super::{AddendaRecord, AddendaTag, check_dfi, check_reason_code, check_trace, expect_type};
use crate::{
    codec::{FieldCursor, LineBuilder, check_digits, check_required_alpha},
    error::FieldError,
    opts::ValidateOpts,
    record::{FixedWidthRecord, codes},
};

/// Corrected data sent back by the RDFI for a forward entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Addenda98 {
    /// `C01`..`C14`
    pub change_code: String,
    pub original_trace: String,
    #[serde(rename = "originalDFI")]
    pub original_dfi: String,
    pub corrected_data: String,
    pub trace_number: String,
}

impl AddendaRecord for Addenda98 {
    fn tag(&self) -> AddendaTag {
        AddendaTag::Addenda98
    }

    fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError> {
        check_reason_code("changeCode", &self.change_code, codes::is_change_code, opts)?;
        check_trace("originalTrace", &self.original_trace)?;
        check_dfi("originalDFI", &self.original_dfi)?;
        check_required_alpha("correctedData", &self.corrected_data, 29)?;
        check_trace("traceNumber", &self.trace_number)
    }
}

impl FixedWidthRecord for Addenda98 {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        expect_type(cursor, AddendaTag::Addenda98)?;
        let change_code = cursor.alpha("changeCode", 3)?;
        let original_trace = cursor.digits("originalTrace", 15)?;
        cursor.skip(6);
        let original_dfi = cursor.digits("originalDFI", 8)?;
        let corrected_data = cursor.alpha("correctedData", 29)?;
        cursor.skip(15);
        Ok(Self {
            change_code,
            original_trace,
            original_dfi,
            corrected_data,
            trace_number: cursor.digits("traceNumber", 15)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('7')
            .literal(AddendaTag::Addenda98.type_code())
            .alpha(&self.change_code, 3)
            .digits(&self.original_trace, 15)
            .blank(6)
            .digits(&self.original_dfi, 8)
            .alpha(&self.corrected_data, 29)
            .blank(15)
            .digits(&self.trace_number, 15)
            .finish()
    }
}

/// An ODFI refusing a notification of change it received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Addenda98Refused {
    /// `C61`..`C69`
    pub refused_change_code: String,
    pub original_trace: String,
    #[serde(rename = "originalDFI")]
    pub original_dfi: String,
    pub corrected_data: String,
    /// Change code of the refused notification.
    pub change_code: String,
    /// Sequence part of the refused notification's trace number.
    pub trace_sequence_number: String,
    pub trace_number: String,
}

impl AddendaRecord for Addenda98Refused {
    fn tag(&self) -> AddendaTag {
        AddendaTag::Addenda98Refused
    }

    fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError> {
        check_reason_code(
            "refusedChangeCode",
            &self.refused_change_code,
            codes::is_refused_change_code,
            opts,
        )?;
        check_trace("originalTrace", &self.original_trace)?;
        check_dfi("originalDFI", &self.original_dfi)?;
        check_required_alpha("correctedData", &self.corrected_data, 29)?;
        check_reason_code("changeCode", &self.change_code, codes::is_change_code, opts)?;
        check_digits("traceSequenceNumber", &self.trace_sequence_number, 7)?;
        check_trace("traceNumber", &self.trace_number)
    }
}

impl FixedWidthRecord for Addenda98Refused {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        expect_type(cursor, AddendaTag::Addenda98Refused)?;
        let refused_change_code = cursor.alpha("refusedChangeCode", 3)?;
        let original_trace = cursor.digits("originalTrace", 15)?;
        cursor.skip(6);
        let original_dfi = cursor.digits("originalDFI", 8)?;
        let corrected_data = cursor.alpha("correctedData", 29)?;
        let change_code = cursor.alpha("changeCode", 3)?;
        let trace_sequence_number = cursor.digits("traceSequenceNumber", 7)?;
        cursor.skip(5);
        Ok(Self {
            refused_change_code,
            original_trace,
            original_dfi,
            corrected_data,
            change_code,
            trace_sequence_number,
            trace_number: cursor.digits("traceNumber", 15)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('7')
            .literal(AddendaTag::Addenda98Refused.type_code())
            .alpha(&self.refused_change_code, 3)
            .digits(&self.original_trace, 15)
            .blank(6)
            .digits(&self.original_dfi, 8)
            .alpha(&self.corrected_data, 29)
            .alpha(&self.change_code, 3)
            .digits(&self.trace_sequence_number, 7)
            .blank(5)
            .digits(&self.trace_number, 15)
            .finish()
    }
}
