use chrono::NaiveDate;

use super::model::{ColumnPresence, SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Filter predicate: an inclusive date range
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range of order dates.
///
/// `start > end` is allowed and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Whether `date` falls inside the range (both ends included).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The range covering the whole dataset. An empty dataset gets a
    /// single-day range on `fallback`.
    pub fn covering(dataset: &SalesDataset, fallback: NaiveDate) -> Self {
        match dataset.date_bounds() {
            Some((start, end)) => DateRange { start, end },
            None => DateRange {
                start: fallback,
                end: fallback,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// The records of a dataset that pass a [`DateRange`], borrowed in dataset
/// order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a SalesRecord>,
    pub columns: ColumnPresence,
}

impl<'a> FilteredView<'a> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Return the records whose date lies within `range`.
pub fn filter_by_date(dataset: &SalesDataset, range: DateRange) -> FilteredView<'_> {
    FilteredView {
        records: dataset
            .records
            .iter()
            .filter(|r| range.contains(r.date))
            .collect(),
        columns: dataset.columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(days: &[u32]) -> SalesDataset {
        let records = days
            .iter()
            .map(|&d| SalesRecord {
                date: ymd(2022, 4, d),
                amount: d as f64,
                city: None,
                status: None,
                latitude: None,
                longitude: None,
            })
            .collect();
        SalesDataset::new(records, ColumnPresence::all())
    }

    #[test]
    fn bounds_are_inclusive() {
        let ds = dataset(&[1, 2, 3, 4, 5]);
        let view = filter_by_date(&ds, DateRange::new(ymd(2022, 4, 2), ymd(2022, 4, 4)));
        let days: Vec<f64> = view.records.iter().map(|r| r.amount).collect();
        assert_eq!(days, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn single_day_range() {
        let ds = dataset(&[1, 3, 3, 5]);
        let view = filter_by_date(&ds, DateRange::new(ymd(2022, 4, 3), ymd(2022, 4, 3)));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn reversed_range_is_empty() {
        let ds = dataset(&[1, 2, 3]);
        let view = filter_by_date(&ds, DateRange::new(ymd(2022, 4, 3), ymd(2022, 4, 1)));
        assert!(view.is_empty());
    }

    #[test]
    fn covering_range_uses_bounds_or_fallback() {
        let ds = dataset(&[9, 2, 6]);
        let fallback = ymd(2026, 1, 1);
        assert_eq!(
            DateRange::covering(&ds, fallback),
            DateRange::new(ymd(2022, 4, 2), ymd(2022, 4, 9))
        );
        let empty = dataset(&[]);
        assert_eq!(
            DateRange::covering(&empty, fallback),
            DateRange::new(fallback, fallback)
        );
    }
}
