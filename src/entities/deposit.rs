// 💰 Interest-bearing deposits
//
// Savings (short-term) and fixed-term deposits share one shape: a balance
// and a rate. The term only changes how the record is described and persisted.

use serde::{Deserialize, Serialize};

use super::record::{Accrual, Header, Ledger, Record};
use crate::catalog::Variant;

// ============================================================================
// TERM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// Withdrawable any time (savings)
    Short,

    /// Locked for a number of months (fixed deposit)
    Locked { months: u32 },
}

// ============================================================================
// ACCRUING RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccruingRecord {
    pub header: Header,
    pub balance: f64,
    /// Interest per accrual, as a fraction (0.05 = 5%)
    pub rate: f64,
    pub term: Term,
}

impl AccruingRecord {
    pub fn savings(id: u64, owner: impl Into<String>, balance: f64, rate: f64) -> Self {
        AccruingRecord {
            header: Header::new(id, owner, 0),
            balance,
            rate,
            term: Term::Short,
        }
    }

    pub fn term_deposit(
        id: u64,
        owner: impl Into<String>,
        balance: f64,
        rate: f64,
        months: u32,
    ) -> Self {
        AccruingRecord {
            header: Header::new(id, owner, 0),
            balance,
            rate,
            term: Term::Locked { months },
        }
    }
}

impl Record for AccruingRecord {
    fn header(&self) -> &Header {
        &self.header
    }

    fn variant(&self) -> Variant {
        match self.term {
            Term::Short => Variant::Savings,
            Term::Locked { .. } => Variant::TermDeposit,
        }
    }

    fn value(&self) -> f64 {
        self.balance
    }

    fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.balance.to_string(), self.rate.to_string()];
        if let Term::Locked { months } = self.term {
            fields.push(months.to_string());
        }
        fields
    }

    fn describe(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Account: {}", self.header.id),
            format!("Owner: {}", self.header.name),
            format!("Balance: {}", self.balance),
            format!("Rate: {}%", self.rate * 100.0),
        ];
        if let Term::Locked { months } = self.term {
            lines.push(format!("Term: {} months", months));
        }
        lines
    }

    fn as_ledger(&self) -> Option<&dyn Ledger> {
        Some(self)
    }

    fn as_ledger_mut(&mut self) -> Option<&mut dyn Ledger> {
        Some(self)
    }

    fn as_accrual_mut(&mut self) -> Option<&mut dyn Accrual> {
        Some(self)
    }
}

impl Ledger for AccruingRecord {
    fn balance(&self) -> f64 {
        self.balance
    }

    fn balance_mut(&mut self) -> &mut f64 {
        &mut self.balance
    }
}

impl Accrual for AccruingRecord {
    fn rate(&self) -> f64 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_savings_accrual_deposits_interest() {
        let mut account = AccruingRecord::savings(1001, "Minh", 1000.0, 0.05);
        let interest = account.apply_accrual().unwrap();
        assert_eq!(interest, 50.0);
        assert_eq!(account.balance, 1050.0);
    }

    #[test]
    fn test_accrual_compounds_on_repeat() {
        let mut account = AccruingRecord::term_deposit(1002, "Lan", 1000.0, 0.1, 12);
        account.apply_accrual().unwrap();
        account.apply_accrual().unwrap();
        assert!((account.balance - 1210.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_accrual_is_noop() {
        let mut account = AccruingRecord::savings(1003, "Hoa", 500.0, 0.0);
        assert_eq!(account.apply_accrual().unwrap(), 0.0);
        assert_eq!(account.apply_accrual().unwrap(), 0.0);
        assert_eq!(account.balance, 500.0);
    }

    #[test]
    fn test_zero_balance_accrual_is_noop() {
        let mut account = AccruingRecord::savings(1004, "Tuan", 0.0, 0.05);
        assert_eq!(account.apply_accrual().unwrap(), 0.0);
        assert_eq!(account.balance, 0.0);
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let mut account = AccruingRecord::savings(1005, "Binh", 100.0, -0.5);
        let err = account.apply_accrual().unwrap_err();
        assert_eq!(err, ValidationError::InvalidAmount { amount: -50.0 });
        assert_eq!(account.balance, 100.0);
    }

    #[test]
    fn test_variant_follows_term() {
        assert_eq!(
            AccruingRecord::savings(1, "A", 1.0, 0.1).variant(),
            Variant::Savings
        );
        assert_eq!(
            AccruingRecord::term_deposit(2, "B", 1.0, 0.1, 6).variant(),
            Variant::TermDeposit
        );
    }

    #[test]
    fn test_describe_includes_rate_and_term() {
        let account = AccruingRecord::term_deposit(7, "Lan", 2000.0, 0.06, 12);
        let lines = account.describe();
        assert_eq!(lines[0], "Account: 7");
        assert_eq!(lines[3], "Rate: 6%");
        assert_eq!(lines[4], "Term: 12 months");
        assert_eq!(account.fields(), vec!["2000", "0.06", "12"]);
    }
}
