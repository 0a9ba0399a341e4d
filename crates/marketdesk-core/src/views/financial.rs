//! Monthly and overall financial rollups over transactions.

use crate::model::{Transaction, TransactionKind};
use serde::Serialize;
use std::collections::BTreeMap;
use time::{Date, Month};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

///
/// MonthBucket
///
/// Receita and Despesa totals for one calendar month.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u8,
    pub label: String,
    pub receita: f64,
    pub despesa: f64,
}

impl MonthBucket {
    fn new(year: i32, month: Month) -> Self {
        Self {
            year,
            month: u8::from(month),
            label: month_label(year, month),
            receita: 0.0,
            despesa: 0.0,
        }
    }

    #[must_use]
    pub fn saldo(&self) -> f64 {
        self.receita - self.despesa
    }
}

///
/// MonthlyRollup
///
/// Buckets in chronological order. `excluded` counts transactions that did
/// not contribute: unrecognized `type` or a date that does not parse.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MonthlyRollup {
    pub months: Vec<MonthBucket>,
    pub excluded: usize,
}

impl MonthlyRollup {
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&MonthBucket> {
        self.months.iter().find(|bucket| bucket.label == label)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Short pt-BR label, e.g. `Jan/24`.
#[must_use]
pub fn month_label(year: i32, month: Month) -> String {
    let name = MONTH_ABBREVIATIONS[usize::from(u8::from(month)) - 1];

    format!("{name}/{:02}", year.rem_euclid(100))
}

/// Group transactions by month and type, summing `amount`.
#[must_use]
pub fn monthly_rollup(transactions: &[Transaction]) -> MonthlyRollup {
    let mut buckets: BTreeMap<(i32, u8), MonthBucket> = BTreeMap::new();
    let mut excluded = 0;

    for tx in transactions {
        let (Some(kind), Some(date)) = (tx.kind(), parse_date(&tx.date)) else {
            excluded += 1;
            continue;
        };

        let bucket = buckets
            .entry((date.year(), u8::from(date.month())))
            .or_insert_with(|| MonthBucket::new(date.year(), date.month()));
        match kind {
            TransactionKind::Receita => bucket.receita += tx.amount,
            TransactionKind::Despesa => bucket.despesa += tx.amount,
        }
    }

    if excluded > 0 {
        tracing::warn!(excluded, "monthly rollup skipped transactions with unknown type or date");
    }

    MonthlyRollup {
        months: buckets.into_values().collect(),
        excluded,
    }
}

///
/// FinancialSummary
///

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub receita: f64,
    pub despesa: f64,
    pub saldo: f64,
    pub counted: usize,
}

/// Overall totals. Transactions with an unrecognized `type` are not counted.
#[must_use]
pub fn summary(transactions: &[Transaction]) -> FinancialSummary {
    let mut out = FinancialSummary::default();

    for tx in transactions {
        match tx.kind() {
            Some(TransactionKind::Receita) => out.receita += tx.amount,
            Some(TransactionKind::Despesa) => out.despesa += tx.amount,
            None => continue,
        }
        out.counted += 1;
    }
    out.saldo = out.receita - out.despesa;

    out
}

// Accepts `YYYY-MM-DD` with an optional time suffix.
fn parse_date(raw: &str) -> Option<Date> {
    let day_part = raw.get(..10)?;
    let mut parts = day_part.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

///
/// TESTS
///
