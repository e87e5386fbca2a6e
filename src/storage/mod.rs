mod repository;

pub use repository::*;

/// SQL migration for the transactions table
pub const MIGRATION_001_TRANSACTIONS: &str = include_str!("migrations/001_transactions.sql");
