// Entity Models
//
// Each record kind lives in its own module and implements the `Record`
// contract from `record`. Optional capabilities (Ledger, Accrual, Loanable)
// are implemented only by the kinds that support them.

pub mod record;
pub mod staff;
pub mod deposit;
pub mod item;

pub use record::{check_amount, Accrual, Header, Ledger, LoanState, Loanable, Record, RecordId};
pub use staff::{MeteredRecord, PlainRecord, SupervisoryRecord, DEFAULT_SURCHARGE, DEFAULT_UNIT_RATE};
pub use deposit::{AccruingRecord, Term};
pub use item::BorrowableRecord;
