// ⚠️ Error taxonomy
// Every failure a caller can recover from, grouped by what went wrong.

use std::path::PathBuf;

use thiserror::Error;

use crate::entities::RecordId;

// ============================================================================
// VALIDATION (bad amounts, short balances)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("amount must be a positive number, got {amount}")]
    InvalidAmount { amount: f64 },

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("balance would become {balance}, which is not a finite number")]
    InvalidBalance { balance: f64 },

    #[error("record {id} does not hold a balance")]
    NoBalance { id: RecordId },

    #[error("record {id} does not accrue interest")]
    NotAccruing { id: RecordId },

    #[error("cannot transfer from record {id} to itself")]
    SameRecord { id: RecordId },
}

// ============================================================================
// PRECONDITION (wrong state for the requested transition)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("'{title}' is already issued")]
    AlreadyIssued { title: String },

    #[error("'{title}' is not issued")]
    NotIssued { title: String },

    #[error("record {id} cannot be borrowed")]
    NotBorrowable { id: RecordId },

    #[error("login failed for '{username}'")]
    LoginFailed { username: String },

    #[error("username '{username}' is already registered")]
    UsernameTaken { username: String },
}

// ============================================================================
// PARSE (persisted lines and files)
// ============================================================================

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot open {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: field '{field}' is not a number: '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: unknown record kind '{tag}'")]
    UnknownVariant { line: usize, tag: String },

    #[error("line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Line the error refers to, if it is a per-line failure
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Unreadable { .. } => None,
            ParseError::FieldCount { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::UnknownVariant { line, .. }
            | ParseError::Read { line, .. } => Some(*line),
        }
    }
}

// ============================================================================
// REGISTRY (everything an operation addressed by id can report)
// ============================================================================

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("record {id} not found")]
    NotFound { id: RecordId },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
