//! Validation switches shared by the reader and the validator.

use serde::{Deserialize, Serialize};

/// Named, individually toggleable relaxations of the NACHA rules.
///
/// Every switch defaults to `false` (strict). A `ValidateOpts` value is
/// copied into the [`File`](crate::File), [`Batch`](crate::Batch) or
/// [`Reader`](crate::Reader) it configures and never changes afterwards.
///
/// # Example
///
/// ```
/// use ach::ValidateOpts;
///
/// let opts = ValidateOpts { allow_unordered_batch_numbers: true, ..ValidateOpts::default() };
/// assert!(!opts.skip_all);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateOpts {
    /// Skip every check. `validate()` always succeeds.
    pub skip_all: bool,
    /// Require the immediate origin to be a routing number with a valid check digit.
    pub require_aba_origin: bool,
    /// Accept any non-blank immediate origin.
    pub bypass_origin_validation: bool,
    /// Accept any non-blank immediate destination.
    pub bypass_destination_validation: bool,
    /// Trace numbers are assigned by the caller: no prefix or ordering checks,
    /// and `create()` only fills in blank ones.
    pub custom_trace_numbers: bool,
    /// A file without batches is valid.
    pub allow_zero_batches: bool,
    /// Read files that start without a File Header record.
    pub allow_missing_file_header: bool,
    /// Read files that end without a File Control record.
    pub allow_missing_file_control: bool,
    /// Batch Header and Batch Control may carry different company identifications.
    pub bypass_company_identification_match: bool,
    /// Accept return and change codes outside the published tables.
    pub custom_return_codes: bool,
    /// Batch Header and Batch Control may carry different service class codes.
    pub unequal_service_class_code: bool,
    /// Batch numbers do not have to ascend through the file.
    pub allow_unordered_batch_numbers: bool,
    /// Routing numbers with a wrong check digit are accepted.
    pub allow_invalid_check_digit: bool,
    /// Addenda counters (CTX/ATX/TRX addenda counts, IAT addenda records) may
    /// disagree with the records present.
    pub unequal_addenda_counts: bool,
    /// Keep leading and trailing spaces of alphanumeric fields while reading.
    pub preserve_spaces: bool,
    /// Skip per-SEC amount limits and the zero amount rules.
    pub allow_invalid_amounts: bool,
}

impl ValidateOpts {
    /// Options that switch every check off.
    #[must_use]
    pub fn permissive() -> Self {
        Self { skip_all: true, ..Self::default() }
    }

    /// `true` when all switches are at their strict default.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert!(ValidateOpts::default().is_strict());
        assert!(!ValidateOpts::permissive().is_strict());
    }

    #[test]
    fn test_deserializes_partial_json() {
        let opts: ValidateOpts =
            serde_json::from_str(r#"{"allowMissingFileHeader":true,"skipAll":false}"#).unwrap();
        assert!(opts.allow_missing_file_header);
        assert!(!opts.allow_missing_file_control);
    }
}
