use anyhow::{Context, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::domain::{
    cents_to_units, units_to_cents, Transaction, TransactionId, TransactionKind, DATE_FORMAT,
};

use super::MIGRATION_001_TRANSACTIONS;

const SELECT_TRANSACTIONS: &str = r#"
    SELECT id, date, type, category, CAST(amount AS REAL) AS amount, note
    FROM transactions
"#;

/// Append-only store for transactions.
///
/// The repository owns its connection pool for its whole lifetime. Every read
/// returns freshly decoded records, never a handle into the database.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the SQLite database described by `options`.
    pub async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let filename = options.get_filename().display().to_string();
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database {}", filename))?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run against an existing ledger.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_TRANSACTIONS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Connect and migrate.
    pub async fn init(options: SqliteConnectOptions) -> Result<Self> {
        let repo = Self::connect(options).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the pool, waiting for open connections to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Append a transaction and assign its id.
    /// The insert is a single autocommitted statement: when this returns the
    /// row is on disk, and when it fails nothing was written.
    pub async fn append(&self, transaction: &mut Transaction) -> Result<TransactionId> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (date, type, category, amount, note)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.date.format(DATE_FORMAT).to_string())
        .bind(transaction.kind.as_str())
        .bind(&transaction.category)
        .bind(cents_to_units(transaction.amount_cents))
        .bind(&transaction.note)
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;

        transaction.id = result.last_insert_rowid();
        debug!(id = transaction.id, kind = %transaction.kind, "appended transaction");
        Ok(transaction.id)
    }

    /// List every transaction, newest date first. Equal dates list the most
    /// recently inserted entry first.
    pub async fn all(&self) -> Result<Vec<Transaction>> {
        let query = format!("{} ORDER BY date DESC, id DESC", SELECT_TRANSACTIONS);
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Count stored transactions.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM transactions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?
            .get("count");
        Ok(count)
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id: TransactionId = row.try_get("id").context("Invalid transaction id")?;
        let date_str: Option<String> = row.try_get("date").context("Invalid date column")?;
        let kind_str: Option<String> = row.try_get("type").context("Invalid type column")?;
        let amount: Option<f64> = row.try_get("amount").context("Invalid amount column")?;
        let category: Option<String> =
            row.try_get("category").context("Invalid category column")?;
        let note: Option<String> = row.try_get("note").context("Invalid note column")?;

        let date_str =
            date_str.ok_or_else(|| anyhow::anyhow!("Transaction {} has no date", id))?;
        let kind_str =
            kind_str.ok_or_else(|| anyhow::anyhow!("Transaction {} has no type", id))?;

        Ok(Transaction {
            id,
            date: chrono::NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid date '{}' on transaction {}", date_str, id))?,
            kind: kind_str
                .parse::<TransactionKind>()
                .map_err(|e| anyhow::anyhow!("Transaction {}: {}", id, e))?,
            category: category.unwrap_or_default(),
            amount_cents: units_to_cents(amount.unwrap_or_default()),
            note: note.unwrap_or_default(),
        })
    }
}
