//! Fixed-width field primitives.
//!
//! Numeric fields are right-justified and zero padded, alphanumeric fields are
//! left-justified and space padded. Encoders never fail: overlong values are
//! truncated (numeric fields keep their rightmost digits), and it is up to
//! validation to reject them.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{FieldError, FieldErrorKind};

/// Right-justifies `value` with zero padding.
///
/// ```
/// use ach::codec::encode_numeric;
///
/// assert_eq!(encode_numeric(42, 6), "000042");
/// assert_eq!(encode_numeric(1234567, 4), "4567");
/// ```
#[must_use]
pub fn encode_numeric(value: u64, width: usize) -> String {
    encode_numeric_str(&value.to_string(), width)
}

/// Right-justifies a string of digits with zero padding.
#[must_use]
pub fn encode_numeric_str(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        value.chars().skip(len - width).collect()
    } else {
        format!("{value:0>width$}")
    }
}

/// Left-justifies `value` with space padding, truncating overlong input.
///
/// ```
/// use ach::codec::encode_alpha;
///
/// assert_eq!(encode_alpha("ACME", 6), "ACME  ");
/// assert_eq!(encode_alpha("ACME CORP", 4), "ACME");
/// ```
#[must_use]
pub fn encode_alpha(value: &str, width: usize) -> String {
    let mut out: String = value.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Decodes a zero-padded numeric field. A blank field decodes to `0`.
pub fn parse_numeric(slice: &str, field: &'static str, width: usize) -> Result<u64, FieldError> {
    check_width(slice, field, width)?;
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if !is_numeric(trimmed) {
        return Err(FieldError::new(field, slice, FieldErrorKind::NonNumeric));
    }
    trimmed
        .parse()
        .map_err(|_| FieldError::new(field, slice, FieldErrorKind::TooLong { max: width }))
}

/// Decodes an alphanumeric field, dropping trailing padding unless
/// `preserve_spaces` is set.
pub fn parse_alpha(
    slice: &str,
    field: &'static str,
    width: usize,
    preserve_spaces: bool,
) -> Result<String, FieldError> {
    check_width(slice, field, width)?;
    if preserve_spaces { Ok(slice.to_string()) } else { Ok(slice.trim_end().to_string()) }
}

/// Decodes a numeric field kept as text (routing numbers, trace numbers),
/// so leading zeros survive. Character class is left to validation.
pub fn parse_digits(slice: &str, field: &'static str, width: usize) -> Result<String, FieldError> {
    check_width(slice, field, width)?;
    Ok(slice.trim().to_string())
}

fn check_width(slice: &str, field: &'static str, width: usize) -> Result<(), FieldError> {
    if slice.len() == width {
        Ok(())
    } else {
        Err(FieldError::new(
            field,
            slice,
            FieldErrorKind::Width { expected: width, actual: slice.len() },
        ))
    }
}

// ============================================================================
// Character classes
// ============================================================================

/// `true` when `value` is non-empty and made of ASCII digits only.
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// `true` when every character is printable ASCII (`0x20..=0x7E`).
#[must_use]
pub fn is_alphanumeric(value: &str) -> bool {
    value.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

/// `true` when `value` is blank or made of `0` only.
#[must_use]
pub fn is_zero_or_blank(value: &str) -> bool {
    value.trim().bytes().all(|b| b == b'0')
}

// ============================================================================
// Field checks used by record validation
// ============================================================================

/// Checks an optional alphanumeric field.
pub fn check_alpha(field: &'static str, value: &str, width: usize) -> Result<(), FieldError> {
    if value.chars().count() > width {
        return Err(FieldError::new(field, value, FieldErrorKind::TooLong { max: width }));
    }
    if !is_alphanumeric(value) {
        return Err(FieldError::new(field, value, FieldErrorKind::NonAlphanumeric));
    }
    Ok(())
}

/// Checks a mandatory alphanumeric field.
pub fn check_required_alpha(
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, value, FieldErrorKind::Required));
    }
    check_alpha(field, value, width)
}

/// Checks a text field that must hold exactly `width` digits.
pub fn check_digits(field: &'static str, value: &str, width: usize) -> Result<(), FieldError> {
    if value.len() != width {
        return Err(FieldError::new(
            field,
            value,
            FieldErrorKind::Width { expected: width, actual: value.len() },
        ));
    }
    if !is_numeric(value) {
        return Err(FieldError::new(field, value, FieldErrorKind::NonNumeric));
    }
    Ok(())
}

/// Checks that a numeric value fits `width` digits.
pub fn check_max(field: &'static str, value: u64, width: usize) -> Result<(), FieldError> {
    let fits = u32::try_from(width)
        .ok()
        .and_then(|w| 10u64.checked_pow(w))
        .is_none_or(|limit| value < limit);
    if fits {
        Ok(())
    } else {
        Err(FieldError::new(field, value.to_string(), FieldErrorKind::TooLong { max: width }))
    }
}

/// Checks a `YYMMDD` date.
pub fn check_date(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.len() == 6 && is_numeric(value) && NaiveDate::parse_from_str(value, "%y%m%d").is_ok() {
        Ok(())
    } else {
        Err(FieldError::new(field, value, FieldErrorKind::InvalidDate))
    }
}

/// Checks an optional `YYMMDD` date.
pub fn check_optional_date(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() { Ok(()) } else { check_date(field, value) }
}

/// Checks a `MMDD` month-day pair.
pub fn check_month_day(field: &'static str, value: &str) -> Result<(), FieldError> {
    // Leap year, so 0229 is accepted.
    let valid = value.len() == 4
        && is_numeric(value)
        && NaiveDate::parse_from_str(&format!("2000{value}"), "%Y%m%d").is_ok();
    if valid { Ok(()) } else { Err(FieldError::new(field, value, FieldErrorKind::InvalidDate)) }
}

/// Checks a `MMYY` card expiration date.
pub fn check_month_year(field: &'static str, value: &str) -> Result<(), FieldError> {
    let month = value.get(..2).and_then(|m| m.parse::<u8>().ok());
    if value.len() == 4 && is_numeric(value) && matches!(month, Some(1..=12)) {
        Ok(())
    } else {
        Err(FieldError::new(field, value, FieldErrorKind::InvalidDate))
    }
}

/// Checks an optional `HHmm` time.
pub fn check_time(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if value.len() == 4 && is_numeric(value) && NaiveTime::parse_from_str(value, "%H%M").is_ok() {
        Ok(())
    } else {
        Err(FieldError::new(field, value, FieldErrorKind::InvalidTime))
    }
}

/// Checks that `value` is one of `codes`.
pub fn check_code(field: &'static str, value: &str, codes: &[&str]) -> Result<(), FieldError> {
    if codes.contains(&value) {
        Ok(())
    } else {
        Err(FieldError::new(field, value, FieldErrorKind::InvalidCode))
    }
}

/// Checks an ISO 3166 / ISO 4217 style code: `width` uppercase letters.
pub fn check_iso_code(field: &'static str, value: &str, width: usize) -> Result<(), FieldError> {
    if value.len() == width && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(FieldError::new(field, value, FieldErrorKind::InvalidCode))
    }
}
