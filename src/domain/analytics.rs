use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{TotalCents, Transaction, TransactionKind};

/// Income, expense and balance over a snapshot of the ledger.
/// Fields are widened so that no ledger can overflow them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: TotalCents,
    pub expense: TotalCents,
    pub balance: TotalCents,
}

/// Compute totals from a list of transactions.
/// Balance = total income - total expense
pub fn totals(transactions: &[Transaction]) -> Totals {
    let (income, expense) =
        transactions
            .iter()
            .fold((0, 0), |(income, expense): (TotalCents, TotalCents), tx| {
                let amount = TotalCents::from(tx.amount_cents);
                match tx.kind {
                    TransactionKind::Income => (income + amount, expense),
                    TransactionKind::Expense => (income, expense + amount),
                }
            });

    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

/// Sum amounts per kind. Kinds with no transactions are not in the map.
pub fn sum_by_kind(transactions: &[Transaction]) -> HashMap<TransactionKind, TotalCents> {
    let mut sums: HashMap<TransactionKind, TotalCents> = HashMap::new();

    for tx in transactions {
        *sums.entry(tx.kind).or_insert(0) += TotalCents::from(tx.amount_cents);
    }

    sums
}

/// Sum amounts per raw category string (case-sensitive, "" included).
pub fn sum_by_category(transactions: &[Transaction]) -> HashMap<String, TotalCents> {
    let mut sums: HashMap<String, TotalCents> = HashMap::new();

    for tx in transactions {
        *sums.entry(tx.category.clone()).or_insert(0) += TotalCents::from(tx.amount_cents);
    }

    sums
}

/// Percentage of `part` in `whole`; 0.0 when `whole` is zero.
pub fn share(part: TotalCents, whole: TotalCents) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Cents;

    fn tx(kind: TransactionKind, category: &str, amount: Cents) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Transaction::new(date, kind, category, amount)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(TransactionKind::Income, "Salary", 5000000),
            tx(TransactionKind::Expense, "Rent", 1500000),
            tx(TransactionKind::Expense, "Food", 42050),
            tx(TransactionKind::Expense, "food", 1000),
            tx(TransactionKind::Income, "", 2500),
            tx(TransactionKind::Expense, "Food", 0),
        ]
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(
            totals(&[]),
            Totals {
                income: 0,
                expense: 0,
                balance: 0
            }
        );
    }

    #[test]
    fn test_totals_mixed() {
        let t = totals(&sample());
        assert_eq!(t.income, 5002500);
        assert_eq!(t.expense, 1543050);
        assert_eq!(t.balance, t.income - t.expense);
    }

    #[test]
    fn test_balance_can_go_negative() {
        let t = totals(&[tx(TransactionKind::Expense, "Rent", 700)]);
        assert_eq!(t.balance, -700);
    }

    #[test]
    fn test_sum_by_kind_omits_missing_kinds() {
        let sums = sum_by_kind(&[tx(TransactionKind::Expense, "Rent", 1500000)]);
        assert_eq!(sums.len(), 1);
        assert_eq!(sums.get(&TransactionKind::Expense), Some(&1500000));
        assert!(!sums.contains_key(&TransactionKind::Income));
    }

    #[test]
    fn test_sum_by_category_is_case_sensitive_and_keeps_empty() {
        let sums = sum_by_category(&sample());
        assert_eq!(sums.get("Food"), Some(&42050));
        assert_eq!(sums.get("food"), Some(&1000));
        assert_eq!(sums.get(""), Some(&2500));
        assert_eq!(sums.get("Salary"), Some(&5000000));
    }

    #[test]
    fn test_groupings_partition_the_total() {
        let transactions = sample();
        let total: TotalCents = transactions
            .iter()
            .map(|t| TotalCents::from(t.amount_cents))
            .sum();

        let by_kind: TotalCents = sum_by_kind(&transactions).values().sum();
        let by_category: TotalCents = sum_by_category(&transactions).values().sum();

        assert_eq!(by_kind, total);
        assert_eq!(by_category, total);
    }

    #[test]
    fn test_sums_past_i64_do_not_overflow() {
        let transactions = vec![
            tx(TransactionKind::Income, "Salary", Cents::MAX),
            tx(TransactionKind::Income, "Salary", Cents::MAX),
            tx(TransactionKind::Expense, "Rent", Cents::MAX),
        ];
        let max = TotalCents::from(Cents::MAX);

        let t = totals(&transactions);
        assert_eq!(t.income, max * 2);
        assert_eq!(t.expense, max);
        assert_eq!(t.balance, max);

        assert_eq!(sum_by_kind(&transactions)[&TransactionKind::Income], max * 2);
        assert_eq!(sum_by_category(&transactions)["Salary"], max * 2);
    }

    #[test]
    fn test_share() {
        assert_eq!(share(0, 0), 0.0);
        assert_eq!(share(25, 100), 25.0);
        assert!((share(1, 3) - 33.333).abs() < 0.01);
    }
}
