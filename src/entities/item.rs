// 📚 Borrowable items - catalog entries that can be issued and returned
//
// Value is availability: 1.0 on the shelf, 0.0 while issued.

use serde::{Deserialize, Serialize};

use super::record::{Header, LoanState, Loanable, Record};
use crate::catalog::Variant;
use crate::error::PreconditionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowableRecord {
    /// `header.name` holds the title
    pub header: Header,
    pub author: String,
    state: LoanState,
}

impl BorrowableRecord {
    pub fn new(id: u64, title: impl Into<String>, author: impl Into<String>) -> Self {
        BorrowableRecord {
            header: Header::new(id, title, 0),
            author: author.into(),
            state: LoanState::Available,
        }
    }

    /// Builder pattern: start in a given loan state (used when loading)
    pub fn with_state(mut self, state: LoanState) -> Self {
        self.state = state;
        self
    }

    pub fn title(&self) -> &str {
        &self.header.name
    }
}

impl Record for BorrowableRecord {
    fn header(&self) -> &Header {
        &self.header
    }

    fn variant(&self) -> Variant {
        Variant::Borrowable
    }

    fn value(&self) -> f64 {
        match self.state {
            LoanState::Available => 1.0,
            LoanState::Issued => 0.0,
        }
    }

    fn fields(&self) -> Vec<String> {
        vec![self.author.clone(), issued_flag(self.state).to_string()]
    }

    fn describe(&self) -> Vec<String> {
        vec![format!(
            "Title: {}, Author: {}, Issued: {}",
            self.header.name,
            self.author,
            if self.is_issued() { "Yes" } else { "No" }
        )]
    }

    fn matches(&self, query: &str) -> bool {
        self.header.name.contains(query) || self.author.contains(query)
    }

    fn as_loanable(&self) -> Option<&dyn Loanable> {
        Some(self)
    }

    fn as_loanable_mut(&mut self) -> Option<&mut dyn Loanable> {
        Some(self)
    }
}

impl Loanable for BorrowableRecord {
    fn state(&self) -> LoanState {
        self.state
    }

    fn issue(&mut self) -> Result<(), PreconditionError> {
        if self.state == LoanState::Issued {
            return Err(PreconditionError::AlreadyIssued {
                title: self.header.name.clone(),
            });
        }
        self.state = LoanState::Issued;
        Ok(())
    }

    fn return_item(&mut self) -> Result<(), PreconditionError> {
        if self.state == LoanState::Available {
            return Err(PreconditionError::NotIssued {
                title: self.header.name.clone(),
            });
        }
        self.state = LoanState::Available;
        Ok(())
    }
}

/// Persisted form of the state: "1" issued, "0" available
pub fn issued_flag(state: LoanState) -> &'static str {
    match state {
        LoanState::Available => "0",
        LoanState::Issued => "1",
    }
}
