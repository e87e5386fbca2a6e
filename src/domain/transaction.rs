use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

/// Surrogate key assigned by the store on insert.
pub type TransactionId = i64;

/// Date format used for the `date` column and for exports.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money coming in (salary, refunds, interest)
    Income,
    /// Money going out (rent, food, bills)
    Expense,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Income, TransactionKind::Expense];

    /// The text stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!(
                "unknown transaction type '{}' (expected income or expense)",
                other
            )),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single income or expense entry. Entries are append-only: once the store
/// has assigned an id the record is never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    /// Amount in cents (never negative; the sign comes from `kind`)
    pub amount_cents: Cents,
    pub note: String,
}

impl Transaction {
    /// Create a new transaction. The id must be assigned by the repository.
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        amount_cents: Cents,
    ) -> Self {
        Self {
            id: 0,
            date,
            kind,
            category: category.into(),
            amount_cents,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in TransactionKind::ALL {
            let parsed: TransactionKind = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!("INCOME".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert_eq!(" expense ".parse::<TransactionKind>(), Ok(TransactionKind::Expense));
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_new_transaction_has_no_id_and_empty_note() {
        let date = parse_date("2024-01-05").unwrap();
        let tx = Transaction::new(date, TransactionKind::Income, "Salary", 5000000);
        assert_eq!(tx.id, 0);
        assert!(tx.note.is_empty());

        let tx = tx.with_note("January");
        assert_eq!(tx.note, "January");
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let date = parse_date("2024-01-10").unwrap();
        let tx = Transaction::new(date, TransactionKind::Expense, "Rent", 100);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "Expense");
        assert_eq!(json["date"], "2024-01-10");
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("05/01/2024").is_err());
    }
}
