//! File Header record (`1`).

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::FixedWidthRecord;
use crate::{
    codec::{
        FieldCursor, LineBuilder, check_alpha, check_date, check_digits, check_required_alpha,
        check_time, validate_routing_number,
    },
    error::{FieldError, FieldErrorKind},
    opts::ValidateOpts,
};

const RECORD_SIZE: &str = "094";
const BLOCKING_FACTOR: &str = "10";
const FORMAT_CODE: &str = "1";

/// First record of every file: who sends it to whom, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileHeader {
    /// Always `01`.
    pub priority_code: String,
    /// Routing number of the receiving point (9 digits, written behind a blank).
    pub immediate_destination: String,
    /// Routing number or company identifier of the sending point.
    pub immediate_origin: String,
    /// `YYMMDD`
    pub file_creation_date: String,
    /// `HHmm`, optional.
    pub file_creation_time: String,
    /// Distinguishes files created on the same date for the same destination (`A`-`Z`, `0`-`9`).
    pub file_id_modifier: String,
    pub immediate_destination_name: String,
    pub immediate_origin_name: String,
    pub reference_code: String,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            priority_code: "01".to_string(),
            immediate_destination: String::new(),
            immediate_origin: String::new(),
            file_creation_date: String::new(),
            file_creation_time: String::new(),
            file_id_modifier: "A".to_string(),
            immediate_destination_name: String::new(),
            immediate_origin_name: String::new(),
            reference_code: String::new(),
        }
    }
}

impl FileHeader {
    /// Header stamped with the current local date and time.
    #[must_use]
    pub fn new(immediate_destination: &str, immediate_origin: &str) -> Self {
        let now = Local::now();
        Self {
            immediate_destination: immediate_destination.to_string(),
            immediate_origin: immediate_origin.to_string(),
            file_creation_date: now.format("%y%m%d").to_string(),
            file_creation_time: now.format("%H%M").to_string(),
            ..Self::default()
        }
    }

    /// Column 4-13 rendering: 9 digits behind a blank, 10 characters verbatim.
    fn routing_field(value: &str) -> String {
        if value.chars().count() == 10 { value.to_string() } else { format!(" {value:0>9}") }
    }

    pub fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError> {
        check_digits("priorityCode", &self.priority_code, 2)?;

        if opts.bypass_destination_validation {
            check_required_alpha("immediateDestination", &self.immediate_destination, 10)?;
        } else {
            check_routing("immediateDestination", &self.immediate_destination, opts)?;
        }

        if opts.require_aba_origin {
            check_routing("immediateOrigin", &self.immediate_origin, opts)?;
        } else if opts.bypass_origin_validation {
            check_alpha("immediateOrigin", &self.immediate_origin, 10)?;
        } else {
            check_required_alpha("immediateOrigin", &self.immediate_origin, 10)?;
        }

        check_date("fileCreationDate", &self.file_creation_date)?;
        check_time("fileCreationTime", &self.file_creation_time)?;

        if !matches!(self.file_id_modifier.as_bytes(), [b'A'..=b'Z' | b'0'..=b'9']) {
            return Err(FieldError::new(
                "fileIdModifier",
                &self.file_id_modifier,
                FieldErrorKind::InvalidCode,
            ));
        }

        check_alpha("immediateDestinationName", &self.immediate_destination_name, 23)?;
        check_alpha("immediateOriginName", &self.immediate_origin_name, 23)?;
        check_alpha("referenceCode", &self.reference_code, 8)
    }
}

/// A 9-digit routing number, check digit enforced unless relaxed.
fn check_routing(field: &'static str, value: &str, opts: &ValidateOpts) -> Result<(), FieldError> {
    check_digits(field, value, 9)?;
    if opts.allow_invalid_check_digit {
        return Ok(());
    }
    validate_routing_number(value).map_err(|err| FieldError { field, ..err })
}

impl FixedWidthRecord for FileHeader {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        let priority_code = cursor.digits("priorityCode", 2)?;
        let immediate_destination = cursor.alpha("immediateDestination", 10)?.trim().to_string();
        let immediate_origin = cursor.alpha("immediateOrigin", 10)?.trim().to_string();
        let file_creation_date = cursor.alpha("fileCreationDate", 6)?;
        let file_creation_time = cursor.alpha("fileCreationTime", 4)?;
        let file_id_modifier = cursor.alpha("fileIdModifier", 1)?;
        cursor.literal("recordSize", RECORD_SIZE)?;
        cursor.literal("blockingFactor", BLOCKING_FACTOR)?;
        cursor.literal("formatCode", FORMAT_CODE)?;
        Ok(Self {
            priority_code,
            immediate_destination,
            immediate_origin,
            file_creation_date,
            file_creation_time,
            file_id_modifier,
            immediate_destination_name: cursor.alpha("immediateDestinationName", 23)?,
            immediate_origin_name: cursor.alpha("immediateOriginName", 23)?,
            reference_code: cursor.alpha("referenceCode", 8)?,
        })
    }

    fn to_line(&self) -> String {
        LineBuilder::new('1')
            .digits(&self.priority_code, 2)
            .alpha(&Self::routing_field(&self.immediate_destination), 10)
            .alpha(&Self::routing_field(&self.immediate_origin), 10)
            .alpha(&self.file_creation_date, 6)
            .alpha(&self.file_creation_time, 4)
            .alpha(&self.file_id_modifier, 1)
            .literal(RECORD_SIZE)
            .literal(BLOCKING_FACTOR)
            .literal(FORMAT_CODE)
            .alpha(&self.immediate_destination_name, 23)
            .alpha(&self.immediate_origin_name, 23)
            .alpha(&self.reference_code, 8)
            .finish()
    }
}
