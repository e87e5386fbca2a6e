use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::debug;

use crate::application::{AnalyticsReport, LedgerService};
use crate::domain::{
    format_cents, parse_cents, parse_date, Transaction, TransactionId, TransactionKind,
    DATE_FORMAT,
};

/// Column headers of the tabular export.
pub const CSV_HEADERS: [&str; 6] = ["ID", "Date", "Type", "Category", "Amount", "Note"];

/// Column headers of the analytics CSV.
pub const ANALYTICS_CSV_HEADERS: [&str; 5] = ["group", "key", "total", "count", "percentage"];

/// Full ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export every transaction to CSV, in the ledger's default read order.
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.service.list_transactions().await?;
        let count = write_transactions_csv(writer, &transactions)?;
        debug!(count, "exported transactions as csv");
        Ok(count)
    }

    /// Export the full ledger as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let transactions = self.service.list_transactions().await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        debug!(count = snapshot.transactions.len(), "exported json snapshot");
        Ok(snapshot)
    }
}

/// Write transactions as CSV rows under [`CSV_HEADERS`].
pub fn write_transactions_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADERS)?;

    for tx in transactions {
        csv_writer.write_record([
            tx.id.to_string(),
            tx.date.format(DATE_FORMAT).to_string(),
            tx.kind.as_str().to_string(),
            tx.category.clone(),
            format_cents(tx.amount_cents),
            tx.note.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(transactions.len())
}

/// Write an analytics report as CSV rows under [`ANALYTICS_CSV_HEADERS`]:
/// the three totals, then one row per type and one per category.
pub fn write_analytics_csv<W: Write>(writer: W, report: &AnalyticsReport) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ANALYTICS_CSV_HEADERS)?;

    let totals = &report.totals;
    for (key, total) in [
        ("income", totals.income),
        ("expense", totals.expense),
        ("balance", totals.balance),
    ] {
        csv_writer.write_record(["totals", key, format_cents(total).as_str(), "", ""])?;
    }

    for kind in &report.by_kind {
        csv_writer.write_record([
            "type".to_string(),
            kind.kind.as_str().to_string(),
            format_cents(kind.total),
            String::new(),
            format!("{:.2}", kind.percentage),
        ])?;
    }

    for cat in &report.by_category {
        csv_writer.write_record([
            "category".to_string(),
            cat.category.clone(),
            format_cents(cat.total),
            cat.count.to_string(),
            format!("{:.2}", cat.percentage),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Read a CSV export back into transactions. Fails on the first bad row.
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut transactions = Vec::new();

    for (index, result) in csv_reader.records().enumerate() {
        let line = index + 2; // header is line 1
        let record = result.with_context(|| format!("CSV parse error on line {}", line))?;
        let tx = parse_record(&record)
            .map_err(|(field, error)| anyhow::anyhow!("Line {}: {}: {}", line, field, error))?;
        transactions.push(tx);
    }

    Ok(transactions)
}

/// Parse one export row. Errors name the offending column.
pub(crate) fn parse_record(record: &csv::StringRecord) -> Result<Transaction, (String, String)> {
    let field = |i: usize| record.get(i).unwrap_or("");
    let fail = |i: usize, msg: String| (CSV_HEADERS[i].to_string(), msg);

    let id = match field(0).trim() {
        "" => 0,
        s => s
            .parse::<TransactionId>()
            .map_err(|_| fail(0, format!("invalid id '{}'", s)))?,
    };
    let date = parse_date(field(1)).map_err(|e| fail(1, format!("{} ('{}')", e, field(1))))?;
    let kind = field(2)
        .parse::<TransactionKind>()
        .map_err(|e| fail(2, e))?;
    let amount_cents = parse_cents(field(4)).map_err(|e| fail(4, e.to_string()))?;

    Ok(Transaction {
        id,
        date,
        kind,
        category: field(3).to_string(),
        amount_cents,
        note: field(5).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Transaction> {
        let mut rent = Transaction::new(
            parse_date("2024-01-10").unwrap(),
            TransactionKind::Expense,
            "Rent",
            1500000,
        )
        .with_note("January, flat 4B");
        rent.id = 2;
        let mut salary = Transaction::new(
            parse_date("2024-01-05").unwrap(),
            TransactionKind::Income,
            "Salary",
            5000000,
        );
        salary.id = 1;
        vec![rent, salary]
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        let count = write_transactions_csv(&mut out, &sample()).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID,Date,Type,Category,Amount,Note");
        assert_eq!(lines[1], "2,2024-01-10,Expense,Rent,15000.00,\"January, flat 4B\"");
        assert_eq!(lines[2], "1,2024-01-05,Income,Salary,50000.00,");
    }

    #[test]
    fn test_csv_reads_back() {
        let original = sample();
        let mut out = Vec::new();
        write_transactions_csv(&mut out, &original).unwrap();

        let parsed = read_transactions_csv(out.as_slice()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_read_reports_line_and_column() {
        let input = "ID,Date,Type,Category,Amount,Note\n1,2024-01-05,Income,Salary,lots,\n";
        let err = read_transactions_csv(input.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Line 2"), "{}", msg);
        assert!(msg.contains("Amount"), "{}", msg);
    }

    #[test]
    fn test_analytics_csv_keeps_awkward_categories_in_one_field() {
        let categories = ["Food\rRent", "Food, drinks", "12\" pizza", "line\nbreak"];
        let transactions: Vec<Transaction> = categories
            .iter()
            .map(|category| {
                Transaction::new(
                    parse_date("2024-01-10").unwrap(),
                    TransactionKind::Expense,
                    *category,
                    100,
                )
            })
            .collect();
        let report = AnalyticsReport::from_transactions(&transactions);

        let mut out = Vec::new();
        write_analytics_csv(&mut out, &report).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        assert_eq!(reader.headers().unwrap(), ANALYTICS_CSV_HEADERS.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        // 3 totals + 1 type + 4 categories
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.len() == 5));
        assert_eq!(&records[1][0], "totals");
        assert_eq!(&records[1][1], "expense");
        assert_eq!(&records[1][2], "4.00");
        assert_eq!(&records[3][1], "Expense");
        assert_eq!(&records[3][4], "100.00");

        let mut read_back: Vec<&str> = records[4..].iter().map(|r| r.get(1).unwrap()).collect();
        read_back.sort();
        let mut expected = categories.to_vec();
        expected.sort();
        assert_eq!(read_back, expected);
        assert!(records[4..].iter().all(|r| &r[3] == "1" && &r[4] == "25.00"));
    }

    #[test]
    fn test_read_accepts_blank_id() {
        let input = "ID,Date,Type,Category,Amount,Note\n,2024-02-01,expense,,0,\n";
        let parsed = read_transactions_csv(input.as_bytes()).unwrap();
        assert_eq!(parsed[0].id, 0);
        assert_eq!(parsed[0].kind, TransactionKind::Expense);
        assert_eq!(parsed[0].category, "");
        assert_eq!(parsed[0].amount_cents, 0);
    }
}
