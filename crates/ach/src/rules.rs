//! SEC code registry.
//!
//! Every Standard Entry Class code maps to a static [`SecRules`] descriptor:
//! which addenda its entries may carry, which are mandatory, how amounts
//! aggregate and which SEC-specific entry fields must be filled in. Batches
//! resolve their descriptor once, at construction, and consult it from both
//! `create()` and `validate()`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    codec::{check_month_year, check_required_alpha},
    error::{ConsistencyError, Error, FieldError, FieldErrorKind, Result},
    opts::ValidateOpts,
    record::{AddendaTag, Category, Direction, EntryDetail},
};

/// Standard Entry Class code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecCode {
    Ack,
    Adv,
    Arc,
    Atx,
    Boc,
    Ccd,
    Cie,
    Cor,
    Ctx,
    Dne,
    Enr,
    Iat,
    Mte,
    Pop,
    Pos,
    Ppd,
    Rck,
    Shr,
    Tel,
    Trc,
    Trx,
    Web,
    Xck,
}

impl SecCode {
    /// Every code, in registry order.
    pub const ALL: [Self; 23] = [
        Self::Ack,
        Self::Adv,
        Self::Arc,
        Self::Atx,
        Self::Boc,
        Self::Ccd,
        Self::Cie,
        Self::Cor,
        Self::Ctx,
        Self::Dne,
        Self::Enr,
        Self::Iat,
        Self::Mte,
        Self::Pop,
        Self::Pos,
        Self::Ppd,
        Self::Rck,
        Self::Shr,
        Self::Tel,
        Self::Trc,
        Self::Trx,
        Self::Web,
        Self::Xck,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ack => "ACK",
            Self::Adv => "ADV",
            Self::Arc => "ARC",
            Self::Atx => "ATX",
            Self::Boc => "BOC",
            Self::Ccd => "CCD",
            Self::Cie => "CIE",
            Self::Cor => "COR",
            Self::Ctx => "CTX",
            Self::Dne => "DNE",
            Self::Enr => "ENR",
            Self::Iat => "IAT",
            Self::Mte => "MTE",
            Self::Pop => "POP",
            Self::Pos => "POS",
            Self::Ppd => "PPD",
            Self::Rck => "RCK",
            Self::Shr => "SHR",
            Self::Tel => "TEL",
            Self::Trc => "TRC",
            Self::Trx => "TRX",
            Self::Web => "WEB",
            Self::Xck => "XCK",
        }
    }

    /// Rule descriptor of the code.
    #[must_use]
    pub fn rules(self) -> &'static SecRules {
        &REGISTRY[self as usize]
    }
}

impl fmt::Display for SecCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecCode {
    type Err = ConsistencyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ConsistencyError::UnknownSec(s.to_string()))
    }
}

/// How the amounts of a batch may be signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    /// Forward entries must be debits.
    Debits,
    /// Forward entries must be credits.
    Credits,
    Mixed,
    /// Every entry carries a zero amount.
    Zero,
}

/// Which addenda an entry must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAddenda {
    None,
    /// Every listed addenda.
    All(&'static [AddendaTag]),
    /// At least one of the listed addenda.
    OneOf(&'static [AddendaTag]),
}

/// SEC-specific check of entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCheck {
    /// ARC, BOC, RCK, XCK, TRC: the identification number holds the check serial number.
    CheckSerialNumber,
    /// POP: check serial number, terminal city and state.
    PopTerminal,
    /// POS, SHR: card transaction type in the discretionary data.
    CardTransactionType,
    /// SHR: card expiration date and document reference number.
    ShrCard,
    IndividualNameRequired,
    IdentificationNumberRequired,
    /// CTX, ATX, TRX: the announced addenda count matches the attached Addenda05.
    AddendaCountField,
    /// WEB, TEL: blank, `R` (recurring) or `S` (single).
    PaymentTypeCode,
    /// The only transaction codes the SEC code admits.
    TransactionCodes(&'static [u8]),
}

/// Card transaction type codes of POS and SHR entries.
const CARD_TRANSACTION_TYPES: &[&str] =
    &["01", "02", "03", "11", "12", "13", "21", "22", "23", "99"];

impl EntryCheck {
    /// Runs the check; error paths are relative to the entry.
    pub fn apply(self, sec: SecCode, entry: &EntryDetail, opts: &ValidateOpts) -> Result<()> {
        let field = |e: FieldError| Error::field("", e);
        match self {
            Self::CheckSerialNumber => {
                check_required_alpha("checkSerialNumber", entry.check_serial_number(), 15)
                    .map_err(field)
            }
            Self::PopTerminal => {
                check_required_alpha("checkSerialNumber", &entry.pop_check_serial_number(), 9)
                    .and_then(|()| {
                        check_required_alpha("terminalCity", &entry.pop_terminal_city(), 4)
                    })
                    .and_then(|()| {
                        check_required_alpha("terminalState", &entry.pop_terminal_state(), 2)
                    })
                    .map_err(field)
            }
            Self::CardTransactionType => {
                let code = entry.card_transaction_type();
                if CARD_TRANSACTION_TYPES.contains(&code) {
                    Ok(())
                } else {
                    Err(field(FieldError::new(
                        "cardTransactionType",
                        code,
                        FieldErrorKind::InvalidCode,
                    )))
                }
            }
            Self::ShrCard => check_month_year(
                "cardExpirationDate",
                &entry.shr_card_expiration_date(),
            )
            .and_then(|()| {
                check_required_alpha(
                    "documentReferenceNumber",
                    &entry.shr_document_reference_number(),
                    11,
                )
            })
            .map_err(field),
            Self::IndividualNameRequired => {
                check_required_alpha("individualName", &entry.individual_name, 22).map_err(field)
            }
            Self::IdentificationNumberRequired => {
                check_required_alpha("identificationNumber", &entry.identification_number, 15)
                    .map_err(field)
            }
            Self::AddendaCountField => {
                let announced = entry.catx_addenda_records().unwrap_or(0);
                let attached = entry.addenda05.len();
                if opts.unequal_addenda_counts || usize::from(announced) == attached {
                    Ok(())
                } else {
                    Err(Error::consistency(
                        "",
                        ConsistencyError::AddendaCardinality {
                            sec,
                            addenda: AddendaTag::Addenda05,
                            max: usize::from(announced),
                            found: attached,
                        },
                    ))
                }
            }
            Self::PaymentTypeCode => match entry.payment_type_code() {
                "" | "R" | "S" => Ok(()),
                other => Err(field(FieldError::new(
                    "paymentTypeCode",
                    other,
                    FieldErrorKind::InvalidCode,
                ))),
            },
            Self::TransactionCodes(allowed) => {
                if allowed.contains(&entry.transaction_code) {
                    Ok(())
                } else {
                    Err(field(FieldError::new(
                        "transactionCode",
                        entry.transaction_code.to_string(),
                        FieldErrorKind::InvalidCode,
                    )))
                }
            }
        }
    }
}

/// Rule descriptor of one SEC code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecRules {
    pub code: SecCode,
    pub description: &'static str,
    /// Addenda variants an entry may carry.
    pub allowed_addenda: &'static [AddendaTag],
    pub required_addenda: RequiredAddenda,
    /// Most Addenda05 records one entry may carry.
    pub max_addenda05: usize,
    pub amounts: AmountRule,
    /// Largest amount of a single entry, in cents.
    pub max_amount: Option<u64>,
    pub entry_checks: &'static [EntryCheck],
    /// Fixed company entry description of the batch header.
    pub company_entry_description: Option<&'static str>,
}

impl SecRules {
    #[must_use]
    pub fn allows(&self, addenda: AddendaTag) -> bool {
        self.allowed_addenda.contains(&addenda)
    }

    /// Addenda placement, cardinality, amount and SEC-specific field rules
    /// for one entry. Error paths are relative to the entry.
    pub fn check_entry(&self, entry: &EntryDetail, opts: &ValidateOpts) -> Result<()> {
        let sec = self.code;
        for record in entry.addenda_records() {
            let addenda = record.tag();
            if !self.allows(addenda) {
                return Err(Error::consistency(
                    "",
                    ConsistencyError::AddendaNotAllowed { sec, addenda },
                ));
            }
        }
        if entry.addenda05.len() > self.max_addenda05 {
            return Err(Error::consistency(
                "",
                ConsistencyError::AddendaCardinality {
                    sec,
                    addenda: AddendaTag::Addenda05,
                    max: self.max_addenda05,
                    found: entry.addenda05.len(),
                },
            ));
        }
        let present: Vec<AddendaTag> = entry.addenda_records().iter().map(|a| a.tag()).collect();
        match self.required_addenda {
            RequiredAddenda::None => {}
            RequiredAddenda::All(tags) => {
                if let Some(&addenda) = tags.iter().find(|tag| !present.contains(tag)) {
                    return Err(Error::consistency(
                        "",
                        ConsistencyError::AddendaRequired { sec, addenda },
                    ));
                }
            }
            RequiredAddenda::OneOf(tags) => {
                let satisfied = tags.iter().any(|tag| present.contains(tag));
                if let (false, Some(&addenda)) = (satisfied, tags.first()) {
                    return Err(Error::consistency(
                        "",
                        ConsistencyError::AddendaRequired { sec, addenda },
                    ));
                }
            }
        }
        check_single_category(&present)?;

        if !opts.allow_invalid_amounts {
            self.check_amount(entry)?;
        }
        for check in self.entry_checks {
            check.apply(sec, entry, opts)?;
        }
        Ok(())
    }

    fn check_amount(&self, entry: &EntryDetail) -> Result<()> {
        let code = entry.transaction_code;
        let forward = entry.category() == Category::Forward;
        let rule = match (self.amounts, entry.direction()) {
            (AmountRule::Debits, Some(Direction::Credit)) if forward => Some("debits only"),
            (AmountRule::Credits, Some(Direction::Debit)) if forward => Some("credits only"),
            _ => None,
        };
        if let Some(rule) = rule {
            return Err(Error::consistency("", ConsistencyError::Direction { code, rule }));
        }
        let over_limit = self.max_amount.is_some_and(|max| entry.amount > max);
        if over_limit || (self.amounts == AmountRule::Zero && entry.amount != 0) {
            return Err(Error::field(
                "",
                FieldError::new("amount", entry.amount.to_string(), FieldErrorKind::Invalid),
            ));
        }
        Ok(())
    }
}

/// An entry carries at most one change or return addenda.
fn check_single_category(present: &[AddendaTag]) -> Result<()> {
    let mut kinds = present.iter().filter(|tag| tag.is_change() || tag.is_return());
    if let (Some(&first), Some(&second)) = (kinds.next(), kinds.next()) {
        return Err(Error::consistency("", ConsistencyError::ConflictingAddenda { first, second }));
    }
    Ok(())
}

// ============================================================================
// Registry
// ============================================================================

const RETURNS: &[AddendaTag] =
    &[AddendaTag::Addenda99, AddendaTag::Addenda99Contested, AddendaTag::Addenda99Dishonored];

const PAYMENT_AND_RETURNS: &[AddendaTag] = &[
    AddendaTag::Addenda05,
    AddendaTag::Addenda99,
    AddendaTag::Addenda99Contested,
    AddendaTag::Addenda99Dishonored,
];

const TERMINAL_AND_RETURNS: &[AddendaTag] = &[
    AddendaTag::Addenda02,
    AddendaTag::Addenda99,
    AddendaTag::Addenda99Contested,
    AddendaTag::Addenda99Dishonored,
];

const CHANGES: &[AddendaTag] = &[AddendaTag::Addenda98, AddendaTag::Addenda98Refused];

const IAT_LEGS: &[AddendaTag] = &[
    AddendaTag::Addenda10,
    AddendaTag::Addenda11,
    AddendaTag::Addenda12,
    AddendaTag::Addenda13,
    AddendaTag::Addenda14,
    AddendaTag::Addenda15,
    AddendaTag::Addenda16,
    AddendaTag::Addenda17,
    AddendaTag::Addenda18,
];

const IAT_MANDATORY: &[AddendaTag] = &[
    AddendaTag::Addenda10,
    AddendaTag::Addenda11,
    AddendaTag::Addenda12,
    AddendaTag::Addenda13,
    AddendaTag::Addenda14,
    AddendaTag::Addenda15,
    AddendaTag::Addenda16,
];

const REQUIRE_TERMINAL: RequiredAddenda = RequiredAddenda::All(&[AddendaTag::Addenda02]);

const CHECK_CONVERSION: &[EntryCheck] = &[EntryCheck::CheckSerialNumber];

const fn rules(code: SecCode, description: &'static str) -> SecRules {
    SecRules {
        code,
        description,
        allowed_addenda: RETURNS,
        required_addenda: RequiredAddenda::None,
        max_addenda05: 0,
        amounts: AmountRule::Mixed,
        max_amount: None,
        entry_checks: &[],
        company_entry_description: None,
    }
}

/// Indexed by `SecCode as usize`.
static REGISTRY: [SecRules; 23] = [
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 1,
        amounts: AmountRule::Zero,
        entry_checks: &[EntryCheck::TransactionCodes(&[24, 34])],
        ..rules(SecCode::Ack, "ACH payment acknowledgment")
    },
    SecRules { allowed_addenda: &[], ..rules(SecCode::Adv, "Automated accounting advice") },
    SecRules {
        amounts: AmountRule::Debits,
        max_amount: Some(2_500_000),
        entry_checks: CHECK_CONVERSION,
        ..rules(SecCode::Arc, "Accounts receivable entry")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 9999,
        amounts: AmountRule::Zero,
        entry_checks: &[EntryCheck::AddendaCountField, EntryCheck::TransactionCodes(&[24, 34])],
        ..rules(SecCode::Atx, "Financial EDI acknowledgment")
    },
    SecRules {
        amounts: AmountRule::Debits,
        max_amount: Some(2_500_000),
        entry_checks: CHECK_CONVERSION,
        ..rules(SecCode::Boc, "Back office conversion")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 1,
        entry_checks: &[EntryCheck::IndividualNameRequired],
        ..rules(SecCode::Ccd, "Corporate credit or debit")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 1,
        amounts: AmountRule::Credits,
        entry_checks: &[EntryCheck::IndividualNameRequired],
        ..rules(SecCode::Cie, "Customer initiated entry")
    },
    SecRules {
        allowed_addenda: CHANGES,
        required_addenda: RequiredAddenda::OneOf(CHANGES),
        amounts: AmountRule::Zero,
        entry_checks: &[EntryCheck::TransactionCodes(&[21, 26, 31, 36, 41, 46, 51, 56])],
        ..rules(SecCode::Cor, "Automated notification of change or refused notification of change")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 9999,
        entry_checks: &[EntryCheck::AddendaCountField],
        ..rules(SecCode::Ctx, "Corporate trade exchange")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 1,
        amounts: AmountRule::Zero,
        entry_checks: &[EntryCheck::TransactionCodes(&[21, 23, 31, 33])],
        ..rules(SecCode::Dne, "Death notification entry")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 9999,
        amounts: AmountRule::Zero,
        company_entry_description: Some("AUTOENROLL"),
        ..rules(SecCode::Enr, "Automated enrollment entry")
    },
    SecRules {
        allowed_addenda: IAT_LEGS,
        required_addenda: RequiredAddenda::All(IAT_MANDATORY),
        ..rules(SecCode::Iat, "International ACH transaction")
    },
    SecRules {
        allowed_addenda: TERMINAL_AND_RETURNS,
        required_addenda: REQUIRE_TERMINAL,
        entry_checks: &[
            EntryCheck::IndividualNameRequired,
            EntryCheck::IdentificationNumberRequired,
        ],
        ..rules(SecCode::Mte, "Machine transfer entry")
    },
    SecRules {
        amounts: AmountRule::Debits,
        max_amount: Some(2_500_000),
        entry_checks: &[EntryCheck::PopTerminal],
        ..rules(SecCode::Pop, "Point of purchase")
    },
    SecRules {
        allowed_addenda: TERMINAL_AND_RETURNS,
        required_addenda: REQUIRE_TERMINAL,
        entry_checks: &[EntryCheck::IndividualNameRequired, EntryCheck::CardTransactionType],
        ..rules(SecCode::Pos, "Point of sale")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 1,
        entry_checks: &[EntryCheck::IndividualNameRequired],
        ..rules(SecCode::Ppd, "Prearranged payment and deposit")
    },
    SecRules {
        amounts: AmountRule::Debits,
        max_amount: Some(250_000),
        entry_checks: CHECK_CONVERSION,
        company_entry_description: Some("REDEPCHECK"),
        ..rules(SecCode::Rck, "Re-presented check entry")
    },
    SecRules {
        allowed_addenda: TERMINAL_AND_RETURNS,
        required_addenda: REQUIRE_TERMINAL,
        entry_checks: &[
            EntryCheck::IndividualNameRequired,
            EntryCheck::CardTransactionType,
            EntryCheck::ShrCard,
        ],
        ..rules(SecCode::Shr, "Shared network transaction")
    },
    SecRules {
        amounts: AmountRule::Debits,
        entry_checks: &[EntryCheck::IndividualNameRequired, EntryCheck::PaymentTypeCode],
        ..rules(SecCode::Tel, "Telephone initiated entry")
    },
    SecRules {
        amounts: AmountRule::Debits,
        entry_checks: CHECK_CONVERSION,
        ..rules(SecCode::Trc, "Check truncation entry")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 9999,
        amounts: AmountRule::Debits,
        entry_checks: &[EntryCheck::AddendaCountField],
        ..rules(SecCode::Trx, "Check truncation entries exchange")
    },
    SecRules {
        allowed_addenda: PAYMENT_AND_RETURNS,
        max_addenda05: 1,
        entry_checks: &[EntryCheck::IndividualNameRequired, EntryCheck::PaymentTypeCode],
        ..rules(SecCode::Web, "Internet initiated entry")
    },
    SecRules {
        amounts: AmountRule::Debits,
        max_amount: Some(250_000),
        entry_checks: CHECK_CONVERSION,
        company_entry_description: Some("NO CHECK"),
        ..rules(SecCode::Xck, "Destroyed check entry")
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Addenda02, Addenda05, Addenda98, Addenda99, codes};

    fn entry(transaction_code: u8, amount: u64) -> EntryDetail {
        EntryDetail {
            individual_name: "Receiver".to_string(),
            trace_number: "121042880000001".to_string(),
            ..EntryDetail::new(transaction_code, "231380104", "12345678", amount)
        }
    }

    #[test]
    fn test_registry_order() {
        for code in SecCode::ALL {
            assert_eq!(code.rules().code, code);
            assert_eq!(code.as_str().parse::<SecCode>(), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!("XYZ".parse::<SecCode>(), Err(ConsistencyError::UnknownSec("XYZ".to_string())));
        assert!("ppd".parse::<SecCode>().is_err());
        assert!("".parse::<SecCode>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SecCode::Ppd).unwrap(), r#""PPD""#);
        assert_eq!(serde_json::from_str::<SecCode>(r#""IAT""#).unwrap(), SecCode::Iat);
    }

    #[test]
    fn test_addenda_allowed() {
        let opts = ValidateOpts::default();
        let mut with_terminal = entry(codes::CHECKING_CREDIT, 100);
        with_terminal.addenda02 = Some(Addenda02::default());
        let err = SecCode::Ppd.rules().check_entry(&with_terminal, &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::AddendaNotAllowed { addenda: AddendaTag::Addenda02, .. },
                ..
            }
        ));

        let mut two = entry(codes::CHECKING_CREDIT, 100);
        two.addenda05 = vec![Addenda05::new("a"), Addenda05::new("b")];
        let err = SecCode::Ppd.rules().check_entry(&two, &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency { error: ConsistencyError::AddendaCardinality { max: 1, .. }, .. }
        ));
    }

    #[test]
    fn test_required_addenda() {
        let opts = ValidateOpts::default();
        let plain = entry(codes::CHECKING_RETURN_NOC_CREDIT, 0);
        let err = SecCode::Cor.rules().check_entry(&plain, &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency {
                error: ConsistencyError::AddendaRequired { sec: SecCode::Cor, .. },
                ..
            }
        ));

        let mut noc = plain;
        noc.addenda98 = Some(Addenda98::default());
        assert!(SecCode::Cor.rules().check_entry(&noc, &opts).is_ok());

        noc.addenda99 = Some(Addenda99::default());
        let err = SecCode::Cor.rules().check_entry(&noc, &opts).unwrap_err();
        assert!(matches!(err, Error::Consistency { .. }));
    }

    #[test]
    fn test_amount_rules() {
        let opts = ValidateOpts::default();
        let credit = EntryDetail {
            identification_number: "123879654".to_string(),
            ..entry(codes::CHECKING_CREDIT, 100)
        };
        let err = SecCode::Arc.rules().check_entry(&credit, &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency { error: ConsistencyError::Direction { code: 22, .. }, .. }
        ));

        let large =
            EntryDetail { transaction_code: codes::CHECKING_DEBIT, amount: 250_001, ..credit };
        assert!(SecCode::Arc.rules().check_entry(&large, &opts).is_ok());
        let err = SecCode::Xck.rules().check_entry(&large, &opts).unwrap_err();
        assert!(matches!(err, Error::Field { ref error, .. } if error.field == "amount"));

        let relaxed = ValidateOpts { allow_invalid_amounts: true, ..opts };
        assert!(SecCode::Xck.rules().check_entry(&large, &relaxed).is_ok());
    }

    #[test]
    fn test_entry_checks() {
        let opts = ValidateOpts::default();
        let no_serial = entry(codes::CHECKING_DEBIT, 100);
        let err = SecCode::Boc.rules().check_entry(&no_serial, &opts).unwrap_err();
        let Error::Field { error, .. } = err else { panic!("expected a field error") };
        assert_eq!(error.field, "checkSerialNumber");

        let mut web = entry(codes::CHECKING_CREDIT, 100);
        web.discretionary_data = "X".to_string();
        let err = SecCode::Web.rules().check_entry(&web, &opts).unwrap_err();
        assert!(matches!(err, Error::Field { ref error, .. } if error.field == "paymentTypeCode"));
        web.discretionary_data = "S".to_string();
        assert!(SecCode::Web.rules().check_entry(&web, &opts).is_ok());
    }

    #[test]
    fn test_catx_addenda_count() {
        let opts = ValidateOpts::default();
        let mut ctx = entry(codes::CHECKING_CREDIT, 100);
        ctx.set_catx_receiving_company("Receiver Company");
        ctx.set_catx_addenda_records(2);
        ctx.addenda05 = vec![Addenda05::new("a")];
        assert!(SecCode::Ctx.rules().check_entry(&ctx, &opts).is_err());

        ctx.addenda05.push(Addenda05::new("b"));
        assert!(SecCode::Ctx.rules().check_entry(&ctx, &opts).is_ok());
    }
}
