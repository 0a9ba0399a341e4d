//! Per-category totals, truncated to the largest N.

use crate::model::{Transaction, TransactionKind, TransactionStatus};
use serde::Serialize;
use std::collections::HashMap;

/// Bucket name for transactions with an empty category.
pub const UNCATEGORIZED: &str = "Sem categoria";

///
/// StatusScope
///
/// Which transaction statuses a category rollup counts. Dashboards disagree
/// here, so every caller picks one explicitly.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatusScope {
    ValidatedOnly,
    ValidatedOrPending,
}

impl StatusScope {
    #[must_use]
    pub const fn includes(self, status: Option<TransactionStatus>) -> bool {
        match (self, status) {
            (_, Some(TransactionStatus::Validado))
            | (Self::ValidatedOrPending, Some(TransactionStatus::Pendente)) => true,
            _ => false,
        }
    }
}

///
/// CategoryRollupOptions
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CategoryRollupOptions {
    pub scope: StatusScope,

    /// Restrict to one transaction type; `None` counts both.
    pub kind: Option<TransactionKind>,
    pub top_n: usize,
}

impl CategoryRollupOptions {
    #[must_use]
    pub const fn new(scope: StatusScope, top_n: usize) -> Self {
        Self {
            scope,
            kind: None,
            top_n,
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

///
/// CategoryTotal
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

/// Sum `amount` by category over the transactions in scope, largest first.
/// Ties are ordered by category name.
#[must_use]
pub fn category_rollup(
    transactions: &[Transaction],
    options: &CategoryRollupOptions,
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, CategoryTotal> = HashMap::new();

    let in_scope = transactions.iter().filter(|tx| {
        options.scope.includes(tx.status())
            && options.kind.is_none_or(|kind| tx.kind() == Some(kind))
    });
    for tx in in_scope {
        let name = match tx.category.trim() {
            "" => UNCATEGORIZED,
            name => name,
        };
        let entry = totals.entry(name).or_insert_with(|| CategoryTotal {
            category: name.to_string(),
            total: 0.0,
            count: 0,
        });
        entry.total += tx.amount;
        entry.count += 1;
    }

    let mut out: Vec<CategoryTotal> = totals.into_values().collect();
    out.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    out.truncate(options.top_n);

    out
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::expense;
    use proptest::prelude::*;
    use crate::model::TransactionStatus::{Pendente, Rejeitado, Validado};

    fn sample() -> Vec<Transaction> {
        vec![
            expense("Marketing", 300.0, Validado),
            expense("Marketing", 200.0, Pendente),
            expense("Aluguel", 400.0, Validado),
            expense("Software", 50.0, Rejeitado),
            expense("", 10.0, Validado),
        ]
    }

    fn names(rollup: &[CategoryTotal]) -> Vec<&str> {
        rollup.iter().map(|c| c.category.as_str()).collect()
    }

    #[test]
    fn validated_only_ignores_pending_and_rejected() {
        let rollup = category_rollup(
            &sample(),
            &CategoryRollupOptions::new(StatusScope::ValidatedOnly, 5),
        );

        assert_eq!(names(&rollup), ["Aluguel", "Marketing", UNCATEGORIZED]);
        assert_eq!(rollup[1].total, 300.0);
        assert_eq!(rollup[1].count, 1);
    }

    #[test]
    fn validated_or_pending_includes_pending() {
        let rollup = category_rollup(
            &sample(),
            &CategoryRollupOptions::new(StatusScope::ValidatedOrPending, 5),
        );

        assert_eq!(names(&rollup), ["Marketing", "Aluguel", UNCATEGORIZED]);
        assert_eq!(rollup[0].total, 500.0);
        assert_eq!(rollup[0].count, 2);
    }

    #[test]
    fn truncates_to_top_n_and_filters_by_kind() {
        let mut txs = sample();
        txs.push(
            Transaction::new(TransactionKind::Receita, 9_999.0, "2024-03-01")
                .with_category("Vendas")
                .with_status(Validado),
        );

        let top = category_rollup(
            &txs,
            &CategoryRollupOptions::new(StatusScope::ValidatedOnly, 2)
                .with_kind(TransactionKind::Despesa),
        );

        assert_eq!(names(&top), ["Aluguel", "Marketing"]);
    }

    #[test]
    fn empty_input_yields_no_categories() {
        let rollup = category_rollup(
            &[],
            &CategoryRollupOptions::new(StatusScope::ValidatedOrPending, 5),
        );

        assert!(rollup.is_empty());
    }

    #[test]
    fn ties_are_ordered_by_name() {
        let txs = [
            expense("Viagem", 100.0, Validado),
            expense("Alimentação", 100.0, Validado),
        ];

        let rollup = category_rollup(&txs, &CategoryRollupOptions::new(StatusScope::ValidatedOnly, 5));

        assert_eq!(names(&rollup), ["Alimentação", "Viagem"]);
    }

    proptest! {
        #[test]
        fn rollup_is_idempotent(
            rows in proptest::collection::vec(
                (
                    prop_oneof![Just("Marketing"), Just("Aluguel"), Just(""), Just("Software")],
                    0u32..100_000,
                    prop_oneof![Just(Validado), Just(Pendente), Just(Rejeitado)],
                ),
                0..50,
            ),
            pending in any::<bool>(),
            top_n in 0usize..6,
        ) {
            let txs: Vec<Transaction> = rows
                .iter()
                .map(|(category, cents, status)| expense(category, f64::from(*cents) / 100.0, *status))
                .collect();
            let scope = if pending { StatusScope::ValidatedOrPending } else { StatusScope::ValidatedOnly };
            let options = CategoryRollupOptions::new(scope, top_n);

            let first = category_rollup(&txs, &options);

            prop_assert_eq!(&first, &category_rollup(&txs, &options));
            prop_assert!(first.len() <= top_n);
            prop_assert!(first.windows(2).all(|w| w[0].total >= w[1].total));
        }
    }
}
