use std::cmp::Ordering;

use api_types::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Date,
    Amount,
    Reference,
}

impl SortColumn {
    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Fecha",
            Self::Amount => "Monto",
            Self::Reference => "Referencia",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Date => Self::Amount,
            Self::Amount => Self::Reference,
            Self::Reference => Self::Date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

/// Ordering of the transactions table. Newest first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl TableSort {
    pub fn cycle_column(&mut self) {
        self.column = self.column.next();
    }

    pub fn toggle_direction(&mut self) {
        self.direction = match self.direction {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        };
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ord = match self.column {
            SortColumn::Date => a.created_at.cmp(&b.created_at),
            SortColumn::Amount => a.amount.total_cmp(&b.amount),
            SortColumn::Reference => a.transaction_reference.cmp(&b.transaction_reference),
        };
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    /// Sorted view over `transactions`; the slice itself keeps its order.
    /// Ties keep their original relative order.
    pub fn view<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut rows: Vec<&Transaction> = transactions.iter().collect();
        rows.sort_by(|a, b| self.compare(a, b));
        rows
    }
}

#[cfg(test)]
mod tests {
    use api_types::transaction::{PaymentMethod, SalesType, TransactionStatus};

    use super::*;

    fn tx(id: &str, created_at: i64, amount: f64, reference: i64) -> Transaction {
        Transaction {
            id: id.to_string(),
            status: TransactionStatus::Successful,
            payment_method: PaymentMethod::Nequi,
            sales_type: SalesType::PaymentLink,
            created_at,
            transaction_reference: reference,
            amount,
            deduction: None,
            franchise: None,
        }
    }

    fn ids(rows: &[&Transaction]) -> Vec<String> {
        rows.iter().map(|tx| tx.id.clone()).collect()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("a", 2_000, 50.0, 3),
            tx("b", 3_000, 10.0, 1),
            tx("c", 1_000, 90.0, 2),
        ]
    }

    #[test]
    fn default_is_newest_first() {
        let data = sample();
        let sort = TableSort::default();
        assert_eq!(ids(&sort.view(&data)), vec!["b", "a", "c"]);
        assert_eq!(ids(&data.iter().collect::<Vec<_>>()), vec!["a", "b", "c"]);
    }

    #[test]
    fn cycles_columns_and_flips_direction() {
        let data = sample();
        let mut sort = TableSort::default();

        sort.cycle_column();
        assert_eq!(sort.column, SortColumn::Amount);
        assert_eq!(ids(&sort.view(&data)), vec!["c", "a", "b"]);

        sort.toggle_direction();
        assert_eq!(ids(&sort.view(&data)), vec!["b", "a", "c"]);

        sort.cycle_column();
        assert_eq!(sort.column, SortColumn::Reference);
        assert_eq!(ids(&sort.view(&data)), vec!["b", "c", "a"]);

        sort.cycle_column();
        assert_eq!(sort.column, SortColumn::Date);
    }

    #[test]
    fn ties_keep_original_order() {
        let data = vec![tx("x", 5, 1.0, 1), tx("y", 5, 1.0, 1)];
        assert_eq!(ids(&TableSort::default().view(&data)), vec!["x", "y"]);
    }
}
