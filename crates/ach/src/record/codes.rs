//! Code tables: service classes, transaction codes, return and change codes.

use serde::{Deserialize, Serialize};

// ============================================================================
// Service class codes
// ============================================================================

/// Batch contains debits and credits.
pub const MIXED_DEBITS_AND_CREDITS: u16 = 200;
/// Batch contains credits only.
pub const CREDITS_ONLY: u16 = 220;
/// Batch contains debits only.
pub const DEBITS_ONLY: u16 = 225;
/// Automated accounting advices (ADV batches).
pub const AUTOMATED_ACCOUNTING_ADVICES: u16 = 280;

#[must_use]
pub fn is_service_class(code: u16) -> bool {
    matches!(
        code,
        MIXED_DEBITS_AND_CREDITS | CREDITS_ONLY | DEBITS_ONLY | AUTOMATED_ACCOUNTING_ADVICES
    )
}

// ============================================================================
// Transaction codes
// ============================================================================

pub const CHECKING_RETURN_NOC_CREDIT: u8 = 21;
pub const CHECKING_CREDIT: u8 = 22;
pub const CHECKING_PRENOTE_CREDIT: u8 = 23;
pub const CHECKING_ZERO_DOLLAR_CREDIT: u8 = 24;
pub const CHECKING_RETURN_NOC_DEBIT: u8 = 26;
pub const CHECKING_DEBIT: u8 = 27;
pub const CHECKING_PRENOTE_DEBIT: u8 = 28;
pub const CHECKING_ZERO_DOLLAR_DEBIT: u8 = 29;
pub const SAVINGS_RETURN_NOC_CREDIT: u8 = 31;
pub const SAVINGS_CREDIT: u8 = 32;
pub const SAVINGS_PRENOTE_CREDIT: u8 = 33;
pub const SAVINGS_ZERO_DOLLAR_CREDIT: u8 = 34;
pub const SAVINGS_RETURN_NOC_DEBIT: u8 = 36;
pub const SAVINGS_DEBIT: u8 = 37;
pub const SAVINGS_PRENOTE_DEBIT: u8 = 38;
pub const SAVINGS_ZERO_DOLLAR_DEBIT: u8 = 39;
pub const GL_RETURN_NOC_CREDIT: u8 = 41;
pub const GL_CREDIT: u8 = 42;
pub const GL_PRENOTE_CREDIT: u8 = 43;
pub const GL_ZERO_DOLLAR_CREDIT: u8 = 44;
pub const GL_RETURN_NOC_DEBIT: u8 = 46;
pub const GL_DEBIT: u8 = 47;
pub const GL_PRENOTE_DEBIT: u8 = 48;
pub const GL_ZERO_DOLLAR_DEBIT: u8 = 49;
pub const LOAN_RETURN_NOC_CREDIT: u8 = 51;
pub const LOAN_CREDIT: u8 = 52;
pub const LOAN_PRENOTE_CREDIT: u8 = 53;
pub const LOAN_ZERO_DOLLAR_CREDIT: u8 = 54;
pub const LOAN_DEBIT: u8 = 55;
pub const LOAN_RETURN_NOC_DEBIT: u8 = 56;

/// Credit for ACH debits originated (ADV).
pub const CREDIT_FOR_DEBITS_ORIGINATED: u8 = 81;
/// Debit for ACH credits originated (ADV).
pub const DEBIT_FOR_CREDITS_ORIGINATED: u8 = 82;
/// Credit for ACH credits received (ADV).
pub const CREDIT_FOR_CREDITS_RECEIVED: u8 = 83;
/// Debit for ACH debits received (ADV).
pub const DEBIT_FOR_DEBITS_RECEIVED: u8 = 84;
/// Credit for ACH credits in rejected batches (ADV).
pub const CREDIT_FOR_CREDITS_REJECTED: u8 = 85;
/// Debit for ACH debits in rejected batches (ADV).
pub const DEBIT_FOR_DEBITS_REJECTED: u8 = 86;
/// Summary credit for respondent ACH activity (ADV).
pub const CREDIT_SUMMARY: u8 = 87;
/// Summary debit for respondent ACH activity (ADV).
pub const DEBIT_SUMMARY: u8 = 88;

/// Direction of money movement from the receiver's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Credit,
    Debit,
}

/// Direction of a transaction code, `None` for unknown codes.
#[must_use]
pub fn direction(code: u8) -> Option<Direction> {
    match code {
        21..=24 | 31..=34 | 41..=44 | 51..=54 | 81 | 83 | 85 | 87 => Some(Direction::Credit),
        26..=29 | 36..=39 | 46..=49 | 55 | 56 | 82 | 84 | 86 | 88 => Some(Direction::Debit),
        _ => None,
    }
}

/// Codes of standard (non-ADV) entries.
#[must_use]
pub fn is_entry_transaction_code(code: u8) -> bool {
    direction(code).is_some() && !is_adv_transaction_code(code)
}

#[must_use]
pub fn is_adv_transaction_code(code: u8) -> bool {
    (81..=88).contains(&code)
}

/// Prenotification codes, which must carry a zero amount.
#[must_use]
pub fn is_prenote(code: u8) -> bool {
    matches!(code, 23 | 28 | 33 | 38 | 43 | 48 | 53)
}

/// Zero dollar remittance codes.
#[must_use]
pub fn is_zero_dollar(code: u8) -> bool {
    matches!(code, 24 | 29 | 34 | 39 | 44 | 49 | 54)
}

/// Codes used by returns and notifications of change.
#[must_use]
pub fn is_return_or_noc(code: u8) -> bool {
    matches!(code, 21 | 26 | 31 | 36 | 41 | 46 | 51 | 56)
}

// ============================================================================
// Return and change codes
// ============================================================================

fn code_number(code: &str, prefix: char) -> Option<u8> {
    let digits = code.strip_prefix(prefix)?;
    if digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Published return reason codes (`R01`..`R85`, with gaps).
#[must_use]
pub fn is_return_code(code: &str) -> bool {
    matches!(code_number(code, 'R'), Some(1..=53 | 61 | 62 | 67..=77 | 80..=85))
}

/// Return codes carried by dishonored returns.
#[must_use]
pub fn is_dishonored_return_code(code: &str) -> bool {
    matches!(code_number(code, 'R'), Some(61 | 67..=70))
}

/// Return codes carried by contested dishonored returns.
#[must_use]
pub fn is_contested_return_code(code: &str) -> bool {
    matches!(code_number(code, 'R'), Some(71..=77))
}

/// Notification of change codes (`C01`..`C14`).
#[must_use]
pub fn is_change_code(code: &str) -> bool {
    matches!(code_number(code, 'C'), Some(1..=14))
}

/// Refused notification of change codes (`C61`..`C69`).
#[must_use]
pub fn is_refused_change_code(code: &str) -> bool {
    matches!(code_number(code, 'C'), Some(61..=69))
}
