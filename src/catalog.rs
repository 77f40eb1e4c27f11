// 🗂️ Variant Catalog - the closed set of record kinds
//
// Maps each kind to its persisted tag and field layout, and rebuilds the
// right concrete record from persisted fields. Adding a kind means adding a
// module under `entities/` and an arm here; the Registry is untouched.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::{
    AccruingRecord, BorrowableRecord, Header, LoanState, MeteredRecord, PlainRecord, Record,
    SupervisoryRecord, Term,
};
use crate::error::ParseError;

/// Header fields that lead every tagged line: id, name, age
pub const HEADER_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Plain,
    Metered,
    Supervisory,
    Savings,
    TermDeposit,
    Borrowable,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Plain,
        Variant::Metered,
        Variant::Supervisory,
        Variant::Savings,
        Variant::TermDeposit,
        Variant::Borrowable,
    ];

    /// Tag written as the first field of a tagged line
    pub fn tag(&self) -> &'static str {
        match self {
            Variant::Plain => "plain",
            Variant::Metered => "metered",
            Variant::Supervisory => "supervisory",
            Variant::Savings => "savings",
            Variant::TermDeposit => "term",
            Variant::Borrowable => "borrowable",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Variant> {
        Variant::ALL.iter().copied().find(|v| v.tag() == tag)
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Plain => "Plain",
            Variant::Metered => "Metered",
            Variant::Supervisory => "Supervisory",
            Variant::Savings => "Savings",
            Variant::TermDeposit => "Term Deposit",
            Variant::Borrowable => "Borrowable",
        }
    }

    /// Kind-specific fields persisted after the header
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Variant::Plain => &["amount"],
            Variant::Metered => &["units", "unit_rate"],
            Variant::Supervisory => &["amount", "reports", "surcharge"],
            Variant::Savings => &["balance", "rate"],
            Variant::TermDeposit => &["balance", "rate", "months"],
            Variant::Borrowable => &["author", "issued"],
        }
    }

    /// Total field count of a tagged line body (header + kind fields, no tag)
    pub fn arity(&self) -> usize {
        HEADER_FIELDS + self.field_names().len()
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// Rebuild a record of `variant` from `id,name,age,<kind fields>`
///
/// `line` is only used to locate errors.
pub fn build(variant: Variant, fields: &[&str], line: usize) -> Result<Box<dyn Record>, ParseError> {
    if fields.len() != variant.arity() {
        return Err(ParseError::FieldCount {
            line,
            expected: variant.arity(),
            found: fields.len(),
        });
    }

    let header = Header::new(
        number(fields[0], "id", line)?,
        fields[1],
        number(fields[2], "age", line)?,
    );
    let rest = &fields[HEADER_FIELDS..];

    let record: Box<dyn Record> = match variant {
        Variant::Plain => Box::new(PlainRecord {
            header,
            amount: quantity(rest[0], "amount", line)?,
        }),
        Variant::Metered => Box::new(MeteredRecord {
            header,
            units: number(rest[0], "units", line)?,
            unit_rate: quantity(rest[1], "unit_rate", line)?,
        }),
        Variant::Supervisory => Box::new(SupervisoryRecord {
            header,
            amount: quantity(rest[0], "amount", line)?,
            reports: number(rest[1], "reports", line)?,
            surcharge: quantity(rest[2], "surcharge", line)?,
        }),
        Variant::Savings => Box::new(AccruingRecord {
            header,
            balance: quantity(rest[0], "balance", line)?,
            rate: quantity(rest[1], "rate", line)?,
            term: Term::Short,
        }),
        Variant::TermDeposit => Box::new(AccruingRecord {
            header,
            balance: quantity(rest[0], "balance", line)?,
            rate: quantity(rest[1], "rate", line)?,
            term: Term::Locked {
                months: number(rest[2], "months", line)?,
            },
        }),
        Variant::Borrowable => {
            let state = if flag(rest[1], line)? {
                LoanState::Issued
            } else {
                LoanState::Available
            };
            let mut item = BorrowableRecord::new(header.id, header.name, rest[0]).with_state(state);
            item.header.age = header.age;
            Box::new(item)
        }
    };

    Ok(record)
}

fn number<T: FromStr>(raw: &str, field: &'static str, line: usize) -> Result<T, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidNumber {
        line,
        field,
        value: raw.to_string(),
    })
}

/// Money and rate fields: finite and not negative
fn quantity(raw: &str, field: &'static str, line: usize) -> Result<f64, ParseError> {
    let value: f64 = number(raw, field, line)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ParseError::InvalidNumber {
            line,
            field,
            value: raw.to_string(),
        })
    }
}

/// "1" is issued, "0" is available; anything else is malformed
fn flag(raw: &str, line: usize) -> Result<bool, ParseError> {
    match raw.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(ParseError::InvalidNumber {
            line,
            field: "issued",
            value: raw.to_string(),
        }),
    }
}
