use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The ledger file could not be opened, written or read, or holds rows
    /// that cannot be decoded.
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}
