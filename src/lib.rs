// Entity Ledger - Core Library
// Exposes all modules for use in the CLI, the TUI browser, and tests

pub mod error;
pub mod entities;
pub mod catalog;        // Variant tags and the record factory
pub mod codec;          // Legacy and tagged line formats
pub mod registry;
pub mod transfer;
pub mod auth;           // Login gate for issue/return
pub mod config;
pub mod journal;        // Audit trail (SQLite)

// Re-export commonly used types
pub use error::{ParseError, PreconditionError, RegistryError, ValidationError};
pub use entities::{
    check_amount, Accrual, Header, Ledger, LoanState, Loanable, Record, RecordId,
    AccruingRecord, Term,
    BorrowableRecord,
    MeteredRecord, PlainRecord, SupervisoryRecord,
};
pub use catalog::Variant;
pub use codec::{Decoded, Format};
pub use registry::{LoadReport, Registry, SaveReport};
pub use transfer::Transfer;
pub use auth::{User, UserStore};
pub use config::LedgerConfig;
pub use journal::{Event, Journal};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
