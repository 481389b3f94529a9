use std::fmt;

use chrono::NaiveDate;
use libris_db::{Record, RecordId};
use serde::{Deserialize, Serialize};

/// Circulation state of a physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoanStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Available,
        LoanStatus::Maintenance,
        LoanStatus::Loaned,
        LoanStatus::Reserved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Available => "Available",
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::Loaned => "Loaned",
            LoanStatus::Reserved => "Reserved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical copy of a book.
///
/// `status` holds the submitted text so a rejected form can be shown back
/// as entered; the store only accepts [`LoanStatus`] names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: RecordId,
    /// Book reference
    pub book: RecordId,
    #[serde(default)]
    pub imprint: String,
    pub status: String,
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    pub fn url(&self) -> String {
        format!("/catalog/bookinstances/{}", self.id)
    }

    pub fn loan_status(&self) -> Option<LoanStatus> {
        LoanStatus::parse(&self.status)
    }
}

impl Record for BookInstance {
    const COLLECTION: &'static str = "bookinstances";
    const INDEXES: &'static [&'static str] = &["book", "status"];

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field(&self, name: &str) -> Vec<&str> {
        match name {
            "book" => vec![self.book.as_str()],
            "status" => vec![self.status.as_str()],
            "imprint" => vec![self.imprint.as_str()],
            _ => Vec::new(),
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.book.is_empty() {
            return Err("book is required".to_string());
        }
        if self.loan_status().is_none() {
            return Err(format!("'{}' is not a valid status", self.status));
        }
        Ok(())
    }
}
