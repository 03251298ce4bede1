//! Transaction filtering.
//!
//! Predicates combine with logical AND and never reorder. An empty
//! predicate set is "no filter", which is reported separately from a
//! filter that happens to match nothing.

use carihesap_common::{day_of, end_of_day, start_of_day, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionType};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Range over whole days. Bounds given in the wrong order are swapped.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Range covering the days two timestamps fall on.
    pub fn from_timestamps(start: Timestamp, end: Timestamp) -> Self {
        Self::new(day_of(start), day_of(end))
    }

    /// A single day.
    pub fn day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// First day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First instant covered.
    pub fn starts_at(&self) -> Timestamp {
        start_of_day(self.start)
    }

    /// Last instant covered.
    pub fn ends_at(&self) -> Timestamp {
        end_of_day(self.end)
    }

    /// Whether a timestamp falls on one of the days.
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        let day = day_of(timestamp);
        self.start <= day && day <= self.end
    }
}

/// One filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// Transaction kind equals the given one.
    Type(TransactionType),
    /// Transaction date falls within the range.
    DateRange(DateRange),
}

impl Predicate {
    /// Check a transaction.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            Predicate::Type(kind) => transaction.kind == *kind,
            Predicate::DateRange(range) => range.contains(transaction.date),
        }
    }
}

/// Result of filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum FilteredView<'a> {
    /// No predicates were given; the whole list.
    Unfiltered(&'a [Transaction]),
    /// Transactions matching every predicate, in original order.
    Filtered(Vec<&'a Transaction>),
}

impl<'a> FilteredView<'a> {
    /// Whether any predicate was applied.
    pub fn is_filter_active(&self) -> bool {
        matches!(self, FilteredView::Filtered(_))
    }

    pub fn len(&self) -> usize {
        match self {
            FilteredView::Unfiltered(all) => all.len(),
            FilteredView::Filtered(matched) => matched.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the visible transactions.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a Transaction> + '_> {
        match self {
            FilteredView::Unfiltered(all) => Box::new(all.iter()),
            FilteredView::Filtered(matched) => Box::new(matched.iter().copied()),
        }
    }

    /// Owned copies of the visible transactions.
    pub fn to_vec(&self) -> Vec<Transaction> {
        self.iter().cloned().collect()
    }
}

/// Filter `transactions` by every predicate in `predicates`.
pub fn filter<'a>(transactions: &'a [Transaction], predicates: &[Predicate]) -> FilteredView<'a> {
    if predicates.is_empty() {
        return FilteredView::Unfiltered(transactions);
    }

    FilteredView::Filtered(
        transactions
            .iter()
            .filter(|tx| predicates.iter().all(|p| p.matches(tx)))
            .collect(),
    )
}

/// Filter criteria as the account detail screen holds them: at most one
/// kind and at most one date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    kind: Option<TransactionType>,
    date_range: Option<DateRange>,
}

impl TransactionFilter {
    /// A filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a kind, replacing any previous one.
    pub fn with_type(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Select a date range, replacing any previous one.
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Drop every criterion.
    pub fn clear(&mut self) {
        self.kind = None;
        self.date_range = None;
    }

    /// Whether any criterion is set.
    pub fn is_active(&self) -> bool {
        self.kind.is_some() || self.date_range.is_some()
    }

    /// Criteria as predicates.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(2);
        if let Some(kind) = self.kind {
            predicates.push(Predicate::Type(kind));
        }
        if let Some(range) = self.date_range {
            predicates.push(Predicate::DateRange(range));
        }
        predicates
    }

    /// Apply to a transaction list.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> FilteredView<'a> {
        filter(transactions, &self.predicates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(kind: TransactionType, at: Timestamp) -> Transaction {
        Transaction::new(kind.label(), dec!(10), kind).with_date(at)
    }

    fn mixed() -> Vec<Transaction> {
        let at = Utc.with_ymd_and_hms(2025, 5, 5, 12, 0, 0).unwrap();
        vec![
            tx(TransactionType::Paid, at),
            tx(TransactionType::Received, at),
            tx(TransactionType::Paid, at),
            tx(TransactionType::Payable, at),
            tx(TransactionType::Receivable, at),
            tx(TransactionType::Paid, at),
        ]
    }

    #[test]
    fn test_no_predicates_returns_everything() {
        let txs = mixed();
        let view = filter(&txs, &[]);

        assert!(!view.is_filter_active());
        assert_eq!(view.len(), txs.len());
        assert_eq!(view.to_vec(), txs);
    }

    #[test]
    fn test_type_filter_keeps_order() {
        let txs = mixed();
        let view = filter(&txs, &[Predicate::Type(TransactionType::Paid)]);

        let expected: Vec<Transaction> = txs
            .iter()
            .filter(|t| t.kind == TransactionType::Paid)
            .cloned()
            .collect();
        assert!(view.is_filter_active());
        assert_eq!(view.len(), 3);
        assert_eq!(view.to_vec(), expected);
    }

    #[test]
    fn test_active_filter_with_no_matches() {
        let txs = vec![tx(TransactionType::Paid, Utc::now())];
        let view = filter(&txs, &[Predicate::Type(TransactionType::Receivable)]);

        assert!(view.is_filter_active());
        assert!(view.is_empty());
    }

    #[test]
    fn test_empty_list_unfiltered_vs_filtered() {
        let txs: Vec<Transaction> = Vec::new();
        assert!(!filter(&txs, &[]).is_filter_active());
        assert!(filter(&txs, &[Predicate::Type(TransactionType::Paid)]).is_filter_active());
    }

    #[test]
    fn test_date_range_bounds_inclusive() {
        let d1 = date(2025, 5, 1);
        let d2 = date(2025, 5, 10);
        let range = DateRange::new(d1, d2);

        let at_start = start_of_day(d1);
        let at_end = start_of_day(d2) + Duration::hours(23) + Duration::minutes(59)
            + Duration::seconds(59) + Duration::milliseconds(999);
        let day_before = at_start - Duration::days(1);
        let day_after = start_of_day(d2) + Duration::days(1);

        let txs = vec![
            tx(TransactionType::Paid, day_before),
            tx(TransactionType::Paid, at_start),
            tx(TransactionType::Paid, at_end),
            tx(TransactionType::Paid, day_after),
        ];

        let view = filter(&txs, &[Predicate::DateRange(range)]);
        let dates: Vec<Timestamp> = view.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![at_start, at_end]);
    }

    #[test]
    fn test_date_range_ignores_time_of_bounds() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 18, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 5, 2, 6, 0, 0).unwrap();
        let range = DateRange::from_timestamps(start, end);

        assert!(range.contains(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2025, 5, 2, 23, 0, 0).unwrap()));
        assert_eq!(range.starts_at(), start_of_day(date(2025, 5, 1)));
        assert_eq!(range.ends_at(), end_of_day(date(2025, 5, 2)));
    }

    #[test]
    fn test_inverted_range_is_swapped() {
        let range = DateRange::new(date(2025, 5, 10), date(2025, 5, 1));
        assert_eq!(range.start(), date(2025, 5, 1));
        assert_eq!(range.end(), date(2025, 5, 10));
    }

    #[test]
    fn test_combined_predicates() {
        let may = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();
        let june = Utc.with_ymd_and_hms(2025, 6, 5, 9, 0, 0).unwrap();
        let txs = vec![
            tx(TransactionType::Paid, may),
            tx(TransactionType::Received, may),
            tx(TransactionType::Paid, june),
        ];

        let filter = TransactionFilter::new()
            .with_type(TransactionType::Paid)
            .with_date_range(DateRange::new(date(2025, 5, 1), date(2025, 5, 31)));
        assert!(filter.is_active());

        let view = filter.apply(&txs);
        assert_eq!(view.len(), 1);
        assert_eq!(view.to_vec()[0].id, txs[0].id);
    }

    #[test]
    fn test_transaction_filter_replace_and_clear() {
        let mut filter = TransactionFilter::new()
            .with_type(TransactionType::Paid)
            .with_type(TransactionType::Payable);
        assert_eq!(filter.predicates(), vec![Predicate::Type(TransactionType::Payable)]);

        filter.clear();
        assert!(!filter.is_active());
        assert!(filter.predicates().is_empty());
    }

    proptest! {
        #[test]
        fn prop_filter_is_ordered_subsequence(
            kinds in prop::collection::vec(prop::sample::select(TransactionType::ALL.to_vec()), 0..30),
            selected in prop::sample::select(TransactionType::ALL.to_vec()),
        ) {
            let at = Utc::now();
            let txs: Vec<Transaction> = kinds.into_iter().map(|k| tx(k, at)).collect();
            let view = filter(&txs, &[Predicate::Type(selected)]);

            let mut cursor = txs.iter();
            for matched in view.iter() {
                prop_assert_eq!(matched.kind, selected);
                prop_assert!(cursor.any(|t| t.id == matched.id));
            }
            prop_assert_eq!(view.len(), txs.iter().filter(|t| t.kind == selected).count());
        }
    }
}
