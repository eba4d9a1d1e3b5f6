//! Addenda records (`7`).
//!
//! The variant is selected by the Addenda Type Code in columns 2-3, and for
//! `98`/`99` additionally by the change or return code in columns 4-6:
//!
//! | type | code            | record                  |
//! |------|-----------------|-------------------------|
//! | `02` |                 | [`Addenda02`]           |
//! | `05` |                 | [`Addenda05`]           |
//! | `10`-`18` |            | IAT legs                |
//! | `98` | `C61`-`C69`     | [`Addenda98Refused`]    |
//! | `98` | other           | [`Addenda98`]           |
//! | `99` | `R61`, `R67`-`R70` | [`Addenda99Dishonored`] |
//! | `99` | `R71`-`R77`     | [`Addenda99Contested`]  |
//! | `99` | other           | [`Addenda99`]           |

mod change;
mod iat;
mod payment;
mod returns;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use change::{Addenda98, Addenda98Refused};
pub use iat::{
    Addenda10, Addenda11, Addenda12, Addenda13, Addenda14, Addenda15, Addenda16, Addenda17,
    Addenda18,
};
pub use payment::{Addenda02, Addenda05};
pub use returns::{Addenda99, Addenda99Contested, Addenda99Dishonored};

use super::{FixedWidthRecord, codes};
use crate::{
    codec::{FieldCursor, check_digits, is_zero_or_blank},
    error::{FieldError, FieldErrorKind},
    opts::ValidateOpts,
};

/// Identifies an addenda variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddendaTag {
    Addenda02,
    Addenda05,
    Addenda10,
    Addenda11,
    Addenda12,
    Addenda13,
    Addenda14,
    Addenda15,
    Addenda16,
    Addenda17,
    Addenda18,
    Addenda98,
    Addenda98Refused,
    Addenda99,
    Addenda99Contested,
    Addenda99Dishonored,
}

impl AddendaTag {
    /// Addenda Type Code written in columns 2-3.
    #[must_use]
    pub const fn type_code(self) -> &'static str {
        match self {
            Self::Addenda02 => "02",
            Self::Addenda05 => "05",
            Self::Addenda10 => "10",
            Self::Addenda11 => "11",
            Self::Addenda12 => "12",
            Self::Addenda13 => "13",
            Self::Addenda14 => "14",
            Self::Addenda15 => "15",
            Self::Addenda16 => "16",
            Self::Addenda17 => "17",
            Self::Addenda18 => "18",
            Self::Addenda98 | Self::Addenda98Refused => "98",
            Self::Addenda99 | Self::Addenda99Contested | Self::Addenda99Dishonored => "99",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Addenda02 => "Addenda02",
            Self::Addenda05 => "Addenda05",
            Self::Addenda10 => "Addenda10",
            Self::Addenda11 => "Addenda11",
            Self::Addenda12 => "Addenda12",
            Self::Addenda13 => "Addenda13",
            Self::Addenda14 => "Addenda14",
            Self::Addenda15 => "Addenda15",
            Self::Addenda16 => "Addenda16",
            Self::Addenda17 => "Addenda17",
            Self::Addenda18 => "Addenda18",
            Self::Addenda98 => "Addenda98",
            Self::Addenda98Refused => "Addenda98Refused",
            Self::Addenda99 => "Addenda99",
            Self::Addenda99Contested => "Addenda99Contested",
            Self::Addenda99Dishonored => "Addenda99Dishonored",
        }
    }

    /// Notification of change addenda.
    #[must_use]
    pub const fn is_change(self) -> bool {
        matches!(self, Self::Addenda98 | Self::Addenda98Refused)
    }

    /// Return addenda, dishonored and contested returns included.
    #[must_use]
    pub const fn is_return(self) -> bool {
        matches!(self, Self::Addenda99 | Self::Addenda99Contested | Self::Addenda99Dishonored)
    }
}

impl fmt::Display for AddendaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour shared by every addenda variant.
pub trait AddendaRecord: FixedWidthRecord + fmt::Debug {
    fn tag(&self) -> AddendaTag;

    /// Checks the fields of the record in isolation.
    fn validate(&self, opts: &ValidateOpts) -> Result<(), FieldError>;
}

/// Any addenda record, as produced by line classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addenda {
    Addenda02(Addenda02),
    Addenda05(Addenda05),
    Addenda10(Addenda10),
    Addenda11(Addenda11),
    Addenda12(Addenda12),
    Addenda13(Addenda13),
    Addenda14(Addenda14),
    Addenda15(Addenda15),
    Addenda16(Addenda16),
    Addenda17(Addenda17),
    Addenda18(Addenda18),
    Addenda98(Addenda98),
    Addenda98Refused(Addenda98Refused),
    Addenda99(Addenda99),
    Addenda99Contested(Addenda99Contested),
    Addenda99Dishonored(Addenda99Dishonored),
}

impl Addenda {
    /// Classifies and decodes one addenda line.
    pub fn parse_with(line: &str, preserve_spaces: bool) -> Result<Self, FieldError> {
        let type_code = line.get(1..3).unwrap_or("");
        let reason = line.get(3..6).unwrap_or("");
        macro_rules! decode {
            ($variant:ident) => {
                $variant::parse_with(line, preserve_spaces).map(Self::$variant)
            };
        }
        match type_code {
            "02" => decode!(Addenda02),
            "05" => decode!(Addenda05),
            "10" => decode!(Addenda10),
            "11" => decode!(Addenda11),
            "12" => decode!(Addenda12),
            "13" => decode!(Addenda13),
            "14" => decode!(Addenda14),
            "15" => decode!(Addenda15),
            "16" => decode!(Addenda16),
            "17" => decode!(Addenda17),
            "18" => decode!(Addenda18),
            "98" if codes::is_refused_change_code(reason) => decode!(Addenda98Refused),
            "98" => decode!(Addenda98),
            "99" if codes::is_dishonored_return_code(reason) => decode!(Addenda99Dishonored),
            "99" if codes::is_contested_return_code(reason) => decode!(Addenda99Contested),
            "99" => decode!(Addenda99),
            other => Err(FieldError::new("typeCode", other, FieldErrorKind::InvalidCode)),
        }
    }

    pub fn parse(line: &str) -> Result<Self, FieldError> {
        Self::parse_with(line, false)
    }

    #[must_use]
    pub fn as_record(&self) -> &dyn AddendaRecord {
        match self {
            Self::Addenda02(a) => a,
            Self::Addenda05(a) => a,
            Self::Addenda10(a) => a,
            Self::Addenda11(a) => a,
            Self::Addenda12(a) => a,
            Self::Addenda13(a) => a,
            Self::Addenda14(a) => a,
            Self::Addenda15(a) => a,
            Self::Addenda16(a) => a,
            Self::Addenda17(a) => a,
            Self::Addenda18(a) => a,
            Self::Addenda98(a) => a,
            Self::Addenda98Refused(a) => a,
            Self::Addenda99(a) => a,
            Self::Addenda99Contested(a) => a,
            Self::Addenda99Dishonored(a) => a,
        }
    }

    #[must_use]
    pub fn tag(&self) -> AddendaTag {
        self.as_record().tag()
    }

    #[must_use]
    pub fn to_line(&self) -> String {
        self.as_record().to_line()
    }
}

// ============================================================================
// Helpers shared by the variants
// ============================================================================

/// Consumes the Addenda Type Code of `tag`.
fn expect_type(cursor: &mut FieldCursor<'_>, tag: AddendaTag) -> Result<(), FieldError> {
    cursor.literal("typeCode", tag.type_code())
}

/// Trace numbers must be 15 digits once assigned.
fn check_trace(field: &'static str, value: &str) -> Result<(), FieldError> {
    check_digits(field, value, 15)
}

/// A sequence number that `create()` must have filled in.
fn check_sequence(field: &'static str, value: u64) -> Result<(), FieldError> {
    if value == 0 {
        Err(FieldError::new(field, "0", FieldErrorKind::Required))
    } else {
        Ok(())
    }
}

/// Routing prefix fields of returns and notifications of change.
fn check_dfi(field: &'static str, value: &str) -> Result<(), FieldError> {
    if is_zero_or_blank(value) {
        return Err(FieldError::new(field, value, FieldErrorKind::Required));
    }
    check_digits(field, value, 8)
}

fn check_reason_code(
    field: &'static str,
    value: &str,
    known: fn(&str) -> bool,
    opts: &ValidateOpts,
) -> Result<(), FieldError> {
    let shaped = value.len() == 3 && value.bytes().all(|b| b.is_ascii_alphanumeric());
    if shaped && (opts.custom_return_codes || known(value)) {
        Ok(())
    } else {
        Err(FieldError::new(field, value, FieldErrorKind::InvalidCode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(type_code: &str, reason: &str) -> String {
        format!("7{type_code}{reason}{}", " ".repeat(88))
    }

    #[test]
    fn test_dispatch_on_type_code() {
        assert_eq!(Addenda::parse(&line("05", "   ")).unwrap().tag(), AddendaTag::Addenda05);
        assert_eq!(Addenda::parse(&line("98", "C01")).unwrap().tag(), AddendaTag::Addenda98);
        assert_eq!(
            Addenda::parse(&line("98", "C62")).unwrap().tag(),
            AddendaTag::Addenda98Refused
        );
        assert_eq!(Addenda::parse(&line("99", "R01")).unwrap().tag(), AddendaTag::Addenda99);
        assert_eq!(
            Addenda::parse(&line("99", "R68")).unwrap().tag(),
            AddendaTag::Addenda99Dishonored
        );
        assert_eq!(
            Addenda::parse(&line("99", "R72")).unwrap().tag(),
            AddendaTag::Addenda99Contested
        );
    }

    #[test]
    fn test_unknown_type_code() {
        let err = Addenda::parse(&line("42", "   ")).unwrap_err();
        assert_eq!((err.field, err.kind), ("typeCode", FieldErrorKind::InvalidCode));
    }

    #[test]
    fn test_tags() {
        assert_eq!(AddendaTag::Addenda98Refused.type_code(), "98");
        assert_eq!(AddendaTag::Addenda99Contested.to_string(), "Addenda99Contested");
        assert!(AddendaTag::Addenda99Dishonored.is_return());
        assert!(AddendaTag::Addenda98.is_change());
        assert!(!AddendaTag::Addenda05.is_change());
    }

    #[test]
    fn test_reason_codes() {
        let strict = ValidateOpts::default();
        let custom = ValidateOpts { custom_return_codes: true, ..strict };
        assert!(check_reason_code("returnCode", "R01", codes::is_return_code, &strict).is_ok());
        assert!(check_reason_code("returnCode", "R99", codes::is_return_code, &strict).is_err());
        assert!(check_reason_code("returnCode", "R99", codes::is_return_code, &custom).is_ok());
        assert!(check_reason_code("returnCode", "", codes::is_return_code, &custom).is_err());
    }
}
