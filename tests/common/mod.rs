// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use fintrack::application::LedgerService;
use fintrack::domain::{Transaction, TransactionKind};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(db_path(&temp_dir).as_str()).await?;
    Ok((service, temp_dir))
}

/// Path of the ledger file inside a test directory
pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("test.db").to_string_lossy().into_owned()
}

/// Helper to parse a date string into NaiveDate
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Record an income with an empty note
pub async fn income(
    service: &LedgerService,
    on: &str,
    category: &str,
    cents: i64,
) -> Result<Transaction> {
    Ok(service
        .record_transaction(date(on), TransactionKind::Income, category, cents, "")
        .await?)
}

/// Record an expense with an empty note
pub async fn expense(
    service: &LedgerService,
    on: &str,
    category: &str,
    cents: i64,
) -> Result<Transaction> {
    Ok(service
        .record_transaction(date(on), TransactionKind::Expense, category, cents, "")
        .await?)
}
