use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    share, sum_by_category, sum_by_kind, totals, TotalCents, Totals, Transaction, TransactionKind,
};

/// Summary figures and grouped sums for a ledger snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub transaction_count: usize,
    pub totals: Totals,
    /// Sum of every amount regardless of kind
    pub turnover: TotalCents,
    pub by_kind: Vec<KindSummary>,
    pub by_category: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindSummary {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub total: TotalCents,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: TotalCents,
    pub count: usize,
    pub percentage: f64,
}

impl AnalyticsReport {
    /// Build the report from a snapshot. Kinds keep their declaration order;
    /// categories are sorted by total descending, then by name.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let totals = totals(transactions);
        let turnover = totals.income + totals.expense;

        let kind_sums = sum_by_kind(transactions);
        let by_kind = TransactionKind::ALL
            .iter()
            .filter_map(|kind| {
                kind_sums.get(kind).map(|&total| KindSummary {
                    kind: *kind,
                    total,
                    percentage: share(total, turnover),
                })
            })
            .collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tx in transactions {
            *counts.entry(tx.category.as_str()).or_insert(0) += 1;
        }

        let mut by_category: Vec<CategorySummary> = sum_by_category(transactions)
            .into_iter()
            .map(|(category, total)| {
                let count = counts.get(category.as_str()).copied().unwrap_or(0);
                CategorySummary {
                    percentage: share(total, turnover),
                    category,
                    total,
                    count,
                }
            })
            .collect();
        by_category.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });

        Self {
            transaction_count: transactions.len(),
            totals,
            turnover,
            by_kind,
            by_category,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}
