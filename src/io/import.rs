use anyhow::Result;
use std::io::Read;
use tracing::{info, warn};

use super::export::parse_record;
use crate::application::LedgerService;

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Importer for loading exported rows back into the ledger
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import transactions from a CSV export. Each valid row is appended as a
    /// new transaction with a fresh id; the `ID` column is ignored. Bad rows
    /// are reported and skipped.
    pub async fn import_transactions_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let tx = match parse_record(&record) {
                Ok(tx) => tx,
                Err((field, error)) => {
                    errors.push(ImportError {
                        line,
                        field: Some(field),
                        error,
                    });
                    continue;
                }
            };

            if options.dry_run {
                imported += 1;
                continue;
            }

            match self
                .service
                .record_transaction(tx.date, tx.kind, tx.category, tx.amount_cents, tx.note)
                .await
            {
                Ok(_) => imported += 1,
                Err(e) => errors.push(ImportError {
                    line,
                    field: None,
                    error: format!("Could not record transaction: {}", e),
                }),
            }
        }

        if !errors.is_empty() {
            warn!(errors = errors.len(), "some rows were not imported");
        }
        info!(imported, dry_run = options.dry_run, "import finished");

        Ok(ImportResult { imported, errors })
    }
}
