// 🧩 Record - the common contract every entity kind implements
//
// A record has an identity (id), a display name, an age-like secondary
// attribute, and a kind-specific rule for computing its value.
// Optional capabilities (balance, interest, lending) are exposed through
// accessor methods so the Registry never needs to know the concrete kind.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Variant;
use crate::error::{PreconditionError, ValidationError};

/// Identity key of a record inside a Registry (uniqueness is the caller's job)
pub type RecordId = u64;

// ============================================================================
// HEADER
// ============================================================================

/// Fields shared by every record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub id: RecordId,
    pub name: String,
    /// Secondary numeric attribute (age for staff, 0 where a kind has none)
    pub age: u32,
}

impl Header {
    pub fn new(id: RecordId, name: impl Into<String>, age: u32) -> Self {
        Header {
            id,
            name: name.into(),
            age,
        }
    }
}

// ============================================================================
// CORE TRAIT
// ============================================================================

/// Record - Core trait (required for every kind)
///
/// Capabilities are opt-in: a kind that holds a balance overrides
/// `as_ledger`/`as_ledger_mut`, one that lends overrides `as_loanable*`.
pub trait Record: fmt::Debug + Send + Sync {
    fn header(&self) -> &Header;

    /// Which catalog entry this record belongs to
    fn variant(&self) -> Variant;

    /// Kind-specific value. Pure: depends only on the record's own fields.
    fn value(&self) -> f64;

    /// Kind-specific persistence fields, in catalog order, after the header
    fn fields(&self) -> Vec<String>;

    fn id(&self) -> RecordId {
        self.header().id
    }

    fn name(&self) -> &str {
        &self.header().name
    }

    fn age(&self) -> u32 {
        self.header().age
    }

    /// Human-readable summary, one entry per display line
    fn describe(&self) -> Vec<String> {
        vec![format!(
            "ID: {}, Name: {}, Age: {}, Value: {}",
            self.id(),
            self.name(),
            self.age(),
            self.value()
        )]
    }

    /// Substring search used by `Registry::search`
    fn matches(&self, query: &str) -> bool {
        self.name().contains(query)
    }

    fn as_ledger(&self) -> Option<&dyn Ledger> {
        None
    }

    fn as_ledger_mut(&mut self) -> Option<&mut dyn Ledger> {
        None
    }

    fn as_accrual_mut(&mut self) -> Option<&mut dyn Accrual> {
        None
    }

    fn as_loanable(&self) -> Option<&dyn Loanable> {
        None
    }

    fn as_loanable_mut(&mut self) -> Option<&mut dyn Loanable> {
        None
    }
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Reject zero, negative, NaN and infinite amounts
pub fn check_amount(amount: f64) -> Result<(), ValidationError> {
    if amount > 0.0 && amount.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount { amount })
    }
}

/// Ledger - optional capability: the record holds a balance
///
/// Rejected calls leave the balance untouched. A balance that is not finite
/// can be neither debited nor credited.
pub trait Ledger {
    fn balance(&self) -> f64;

    fn balance_mut(&mut self) -> &mut f64;

    fn deposit(&mut self, amount: f64) -> Result<(), ValidationError> {
        check_amount(amount)?;
        let balance = self.balance() + amount;
        if !balance.is_finite() {
            return Err(ValidationError::InvalidBalance { balance });
        }
        *self.balance_mut() = balance;
        Ok(())
    }

    fn withdraw(&mut self, amount: f64) -> Result<(), ValidationError> {
        check_amount(amount)?;
        let available = self.balance();
        if !available.is_finite() {
            return Err(ValidationError::InvalidBalance { balance: available });
        }
        if available < amount {
            return Err(ValidationError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        *self.balance_mut() -= amount;
        Ok(())
    }
}

/// Accrual - optional capability: interest is paid back into the balance
pub trait Accrual: Ledger {
    fn rate(&self) -> f64;

    /// Deposit `balance * rate`, returning the interest paid.
    ///
    /// Compounds on every call. Zero interest is a no-op, negative interest
    /// is rejected by `deposit`.
    fn apply_accrual(&mut self) -> Result<f64, ValidationError> {
        let interest = self.balance() * self.rate();
        if interest == 0.0 {
            return Ok(0.0);
        }
        self.deposit(interest)?;
        Ok(interest)
    }
}

/// Two-state lending machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanState {
    Available,
    Issued,
}

impl LoanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanState::Available => "Available",
            LoanState::Issued => "Issued",
        }
    }
}

/// Loanable - optional capability: the record can be issued and returned
pub trait Loanable {
    fn state(&self) -> LoanState;

    /// Available -> Issued
    fn issue(&mut self) -> Result<(), PreconditionError>;

    /// Issued -> Available
    fn return_item(&mut self) -> Result<(), PreconditionError>;

    fn is_issued(&self) -> bool {
        self.state() == LoanState::Issued
    }
}
