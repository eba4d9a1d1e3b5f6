//! ABA routing number check digit.
//!
//! The 9th digit of a routing number is computed from the first eight with
//! the weights `3, 7, 1` repeating: the check digit brings the weighted sum
//! up to the next multiple of ten.

use crate::{
    codec::is_numeric,
    error::{FieldError, FieldErrorKind},
};

const WEIGHTS: [u32; 8] = [3, 7, 1, 3, 7, 1, 3, 7];

/// Computes the check digit over the first 8 digits of `routing`.
///
/// ```
/// use ach::codec::check_digit;
///
/// assert_eq!(check_digit("23138010").unwrap(), 4);
/// ```
pub fn check_digit(routing: &str) -> Result<u8, FieldError> {
    let prefix = routing
        .get(..8)
        .filter(|p| is_numeric(p))
        .ok_or_else(|| FieldError::new("routingNumber", routing, FieldErrorKind::NonNumeric))?;

    let sum: u32 =
        prefix.bytes().zip(WEIGHTS).map(|(b, weight)| u32::from(b - b'0') * weight).sum();
    // sum % 10 < 10, so the digit always fits.
    Ok(((10 - sum % 10) % 10) as u8)
}

/// Recomputes the check digit of a 9-digit routing number and compares it to the 9th digit.
pub fn validate_routing_number(routing: &str) -> Result<(), FieldError> {
    if routing.len() != 9 {
        return Err(FieldError::new(
            "routingNumber",
            routing,
            FieldErrorKind::Width { expected: 9, actual: routing.len() },
        ));
    }
    if !is_numeric(routing) {
        return Err(FieldError::new("routingNumber", routing, FieldErrorKind::NonNumeric));
    }
    let expected = check_digit(routing)?;
    let actual = routing.as_bytes()[8] - b'0';
    if expected == actual {
        Ok(())
    } else {
        Err(FieldError::new("routingNumber", routing, FieldErrorKind::CheckDigit { expected }))
    }
}

/// Entry hash contribution of an 8-digit RDFI identification. Non-numeric
/// values contribute nothing; validation reports them separately.
#[must_use]
pub fn hash_component(rdfi_identification: &str) -> u64 {
    rdfi_identification.get(..8).and_then(|p| p.parse().ok()).unwrap_or(0)
}
