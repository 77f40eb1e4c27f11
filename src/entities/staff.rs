// 👥 Staff kinds - roster records with pay rules
//
// Plain:       value = stored amount
// Metered:     value = units × unit rate (no stored amount)
// Supervisory: value = stored amount + reports × per-report surcharge

use serde::{Deserialize, Serialize};

use super::record::{Header, Ledger, Record};
use crate::catalog::Variant;

/// Default pay per metered unit
pub const DEFAULT_UNIT_RATE: f64 = 25.0;

/// Default surcharge per direct report
pub const DEFAULT_SURCHARGE: f64 = 1.0;

// ============================================================================
// PLAIN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainRecord {
    pub header: Header,
    pub amount: f64,
}

impl PlainRecord {
    pub fn new(id: u64, name: impl Into<String>, age: u32, amount: f64) -> Self {
        PlainRecord {
            header: Header::new(id, name, age),
            amount,
        }
    }
}

impl Record for PlainRecord {
    fn header(&self) -> &Header {
        &self.header
    }

    fn variant(&self) -> Variant {
        Variant::Plain
    }

    fn value(&self) -> f64 {
        self.amount
    }

    fn fields(&self) -> Vec<String> {
        vec![self.amount.to_string()]
    }

    fn as_ledger(&self) -> Option<&dyn Ledger> {
        Some(self)
    }

    fn as_ledger_mut(&mut self) -> Option<&mut dyn Ledger> {
        Some(self)
    }
}

impl Ledger for PlainRecord {
    fn balance(&self) -> f64 {
        self.amount
    }

    fn balance_mut(&mut self) -> &mut f64 {
        &mut self.amount
    }
}

// ============================================================================
// METERED
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeteredRecord {
    pub header: Header,
    pub units: u32,
    pub unit_rate: f64,
}

impl MeteredRecord {
    pub fn new(id: u64, name: impl Into<String>, age: u32, units: u32) -> Self {
        Self::with_rate(id, name, age, units, DEFAULT_UNIT_RATE)
    }

    pub fn with_rate(
        id: u64,
        name: impl Into<String>,
        age: u32,
        units: u32,
        unit_rate: f64,
    ) -> Self {
        MeteredRecord {
            header: Header::new(id, name, age),
            units,
            unit_rate,
        }
    }
}

impl Record for MeteredRecord {
    fn header(&self) -> &Header {
        &self.header
    }

    fn variant(&self) -> Variant {
        Variant::Metered
    }

    fn value(&self) -> f64 {
        f64::from(self.units) * self.unit_rate
    }

    fn fields(&self) -> Vec<String> {
        vec![self.units.to_string(), self.unit_rate.to_string()]
    }
}

// ============================================================================
// SUPERVISORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisoryRecord {
    pub header: Header,
    pub amount: f64,
    /// Number of direct reports
    pub reports: u32,
    pub surcharge: f64,
}

impl SupervisoryRecord {
    pub fn new(id: u64, name: impl Into<String>, age: u32, amount: f64, reports: u32) -> Self {
        Self::with_surcharge(id, name, age, amount, reports, DEFAULT_SURCHARGE)
    }

    pub fn with_surcharge(
        id: u64,
        name: impl Into<String>,
        age: u32,
        amount: f64,
        reports: u32,
        surcharge: f64,
    ) -> Self {
        SupervisoryRecord {
            header: Header::new(id, name, age),
            amount,
            reports,
            surcharge,
        }
    }
}

impl Record for SupervisoryRecord {
    fn header(&self) -> &Header {
        &self.header
    }

    fn variant(&self) -> Variant {
        Variant::Supervisory
    }

    fn value(&self) -> f64 {
        self.amount + f64::from(self.reports) * self.surcharge
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.amount.to_string(),
            self.reports.to_string(),
            self.surcharge.to_string(),
        ]
    }

    fn describe(&self) -> Vec<String> {
        vec![
            format!(
                "ID: {}, Name: {}, Age: {}, Value: {}",
                self.header.id,
                self.header.name,
                self.header.age,
                self.value()
            ),
            format!("Reports: {}", self.reports),
        ]
    }

    fn as_ledger(&self) -> Option<&dyn Ledger> {
        Some(self)
    }

    fn as_ledger_mut(&mut self) -> Option<&mut dyn Ledger> {
        Some(self)
    }
}

impl Ledger for SupervisoryRecord {
    fn balance(&self) -> f64 {
        self.amount
    }

    fn balance_mut(&mut self) -> &mut f64 {
        &mut self.amount
    }
}
