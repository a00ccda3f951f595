use api_types::transaction::{Transaction, TransactionStatus};
use serde::Serialize;

/// Aggregates of a (filtered) transaction list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TransactionStats {
    pub total_amount: f64,
    pub total_transactions: usize,
    pub successful_transactions: usize,
    pub rejected_transactions: usize,
    /// `0` for an empty list.
    pub average_amount: f64,
}

pub fn compute_stats(transactions: &[Transaction]) -> TransactionStats {
    let mut stats = TransactionStats {
        total_transactions: transactions.len(),
        ..TransactionStats::default()
    };

    for tx in transactions {
        stats.total_amount += tx.amount;
        match tx.status {
            TransactionStatus::Successful => stats.successful_transactions += 1,
            TransactionStatus::Rejected => stats.rejected_transactions += 1,
        }
    }

    if stats.total_transactions > 0 {
        stats.average_amount = stats.total_amount / stats.total_transactions as f64;
    }
    stats
}
