use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnectOptions;
use tracing::{debug, info};

use crate::domain::{format_cents, Cents, Transaction, TransactionKind, MAX_AMOUNT_CENTS};
use crate::storage::Repository;

use super::{AnalyticsReport, AppError};

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the ledger at the given path, creating the file and the
    /// transactions table when missing. The path is taken literally, so `?`
    /// and `#` are ordinary file name characters.
    pub async fn open(database_path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);
        let repo = Repository::init(options).await?;
        debug!(path = database_path, "opened ledger");
        Ok(Self::new(repo))
    }

    /// Release the underlying database connections.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    /// Record a new income or expense. The returned transaction carries the
    /// id assigned by the store.
    pub async fn record_transaction(
        &self,
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        amount_cents: Cents,
        note: impl Into<String>,
    ) -> Result<Transaction, AppError> {
        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(format!(
                "{} is negative; use the transaction type for direction",
                format_cents(amount_cents)
            )));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(AppError::InvalidAmount(format!(
                "{} exceeds the largest supported amount {}",
                format_cents(amount_cents),
                format_cents(MAX_AMOUNT_CENTS)
            )));
        }

        let mut transaction =
            Transaction::new(date, kind, category, amount_cents).with_note(note);
        self.repo.append(&mut transaction).await?;

        info!(
            id = transaction.id,
            kind = %transaction.kind,
            amount = %format_cents(transaction.amount_cents),
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// All transactions, newest date first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.all().await?)
    }

    /// Number of stored transactions.
    pub async fn count_transactions(&self) -> Result<i64, AppError> {
        Ok(self.repo.count().await?)
    }

    /// Totals and grouped sums over the current ledger.
    pub async fn analytics(&self) -> Result<AnalyticsReport, AppError> {
        let snapshot = self.repo.all().await?;
        debug!(transactions = snapshot.len(), "building analytics report");
        Ok(AnalyticsReport::from_transactions(&snapshot))
    }
}
