//! Fixed-width codec.
//!
//! Every NACHA record is a 94-byte ASCII line made of fields at fixed
//! offsets. [`LineBuilder`] lays fields out left to right for encoding,
//! [`FieldCursor`] walks them in the same order for decoding, so a record's
//! `to_line` and `decode` read as the same column table.

mod field;
mod routing;

pub use field::{
    check_alpha, check_code, check_date, check_digits, check_iso_code, check_max, check_month_day,
    check_month_year, check_optional_date, check_required_alpha, check_time, encode_alpha,
    encode_numeric, encode_numeric_str, is_alphanumeric, is_numeric, is_zero_or_blank,
    parse_alpha, parse_digits, parse_numeric,
};
pub use routing::{check_digit, hash_component, validate_routing_number};

use crate::error::{FieldError, FieldErrorKind};

/// Width of every record line.
pub const RECORD_LENGTH: usize = 94;

/// Builds one record line field by field.
///
/// ```
/// use ach::codec::LineBuilder;
///
/// let line = LineBuilder::new('9').numeric(1, 6).blank(87).finish();
/// assert_eq!(line.len(), 94);
/// assert!(line.starts_with("9000001"));
/// ```
#[derive(Debug)]
pub struct LineBuilder {
    buf: String,
}

impl LineBuilder {
    /// Starts a line with its record type code.
    #[must_use]
    pub fn new(record_type: char) -> Self {
        let mut buf = String::with_capacity(RECORD_LENGTH);
        buf.push(record_type);
        Self { buf }
    }

    /// Zero-padded numeric field.
    #[must_use]
    pub fn numeric(mut self, value: u64, width: usize) -> Self {
        self.buf.push_str(&encode_numeric(value, width));
        self
    }

    /// Zero-padded numeric field kept as text.
    #[must_use]
    pub fn digits(mut self, value: &str, width: usize) -> Self {
        self.buf.push_str(&encode_numeric_str(value, width));
        self
    }

    /// Space-padded alphanumeric field.
    #[must_use]
    pub fn alpha(mut self, value: &str, width: usize) -> Self {
        self.buf.push_str(&encode_alpha(value, width));
        self
    }

    /// Reserved columns.
    #[must_use]
    pub fn blank(self, width: usize) -> Self {
        self.alpha("", width)
    }

    /// Literal text (fixed constants such as the record size `094`).
    #[must_use]
    pub fn literal(mut self, value: &str) -> Self {
        self.buf.push_str(value);
        self
    }

    #[must_use]
    pub fn finish(self) -> String {
        debug_assert_eq!(self.buf.chars().count(), RECORD_LENGTH, "{}", self.buf);
        self.buf
    }
}

/// Reads the fields of one record line in column order.
///
/// Construction checks that the line is 94 ASCII bytes, so the byte offsets
/// used afterwards always fall on character boundaries.
#[derive(Debug)]
pub struct FieldCursor<'a> {
    line: &'a str,
    pos: usize,
    preserve_spaces: bool,
}

impl<'a> FieldCursor<'a> {
    /// Positions the cursor after the record type code.
    pub fn new(line: &'a str) -> Result<Self, FieldError> {
        if line.len() != RECORD_LENGTH {
            return Err(FieldError::new(
                "record",
                line,
                FieldErrorKind::Width { expected: RECORD_LENGTH, actual: line.len() },
            ));
        }
        if !line.is_ascii() {
            return Err(FieldError::new("record", line, FieldErrorKind::NonAlphanumeric));
        }
        Ok(Self { line, pos: 1, preserve_spaces: false })
    }

    /// Keeps alphanumeric fields verbatim instead of trimming trailing spaces.
    #[must_use]
    pub fn preserve_spaces(mut self, preserve: bool) -> Self {
        self.preserve_spaces = preserve;
        self
    }

    /// Full line under the cursor.
    #[must_use]
    pub fn line(&self) -> &'a str {
        self.line
    }

    fn take(&mut self, width: usize) -> &'a str {
        let slice = self.line.get(self.pos..self.pos + width).unwrap_or("");
        self.pos += width;
        slice
    }

    pub fn numeric(&mut self, field: &'static str, width: usize) -> Result<u64, FieldError> {
        parse_numeric(self.take(width), field, width)
    }

    pub fn digits(&mut self, field: &'static str, width: usize) -> Result<String, FieldError> {
        parse_digits(self.take(width), field, width)
    }

    pub fn alpha(&mut self, field: &'static str, width: usize) -> Result<String, FieldError> {
        let preserve = self.preserve_spaces;
        parse_alpha(self.take(width), field, width, preserve)
    }

    /// Numeric field narrower than `u8`.
    pub fn small(&mut self, field: &'static str, width: usize) -> Result<u8, FieldError> {
        let slice = self.take(width);
        let value = parse_numeric(slice, field, width)?;
        u8::try_from(value).map_err(|_| FieldError::new(field, slice, FieldErrorKind::InvalidCode))
    }

    /// Skips reserved columns.
    pub fn skip(&mut self, width: usize) {
        self.pos += width;
    }

    /// Consumes a fixed literal, failing when the line carries something else.
    pub fn literal(&mut self, field: &'static str, expected: &str) -> Result<(), FieldError> {
        let slice = self.take(expected.len());
        if slice == expected {
            Ok(())
        } else {
            Err(FieldError::new(field, slice, FieldErrorKind::InvalidCode))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_cursor_agree() {
        let line = LineBuilder::new('6')
            .numeric(22, 2)
            .digits("23138010", 8)
            .alpha("ACCOUNT", 83)
            .finish();

        let mut cursor = FieldCursor::new(&line).unwrap();
        assert_eq!(cursor.small("transactionCode", 2), Ok(22));
        assert_eq!(cursor.digits("rdfiIdentification", 8), Ok("23138010".to_string()));
        assert_eq!(cursor.alpha("rest", 83), Ok("ACCOUNT".to_string()));
    }

    #[test]
    fn test_cursor_rejects_short_and_non_ascii_lines() {
        assert!(FieldCursor::new("1").is_err());
        let wide = format!("{}é", "1".repeat(92));
        assert_eq!(wide.len(), 94);
        assert_eq!(
            FieldCursor::new(&wide).unwrap_err().kind,
            FieldErrorKind::NonAlphanumeric
        );
    }

    #[test]
    fn test_cursor_literal() {
        let line = LineBuilder::new('1').literal("094").blank(90).finish();
        let mut cursor = FieldCursor::new(&line).unwrap();
        assert!(cursor.literal("recordSize", "094").is_ok());

        let mut cursor = FieldCursor::new(&line).unwrap();
        assert!(cursor.literal("recordSize", "095").is_err());
    }
}
