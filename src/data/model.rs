use chrono::NaiveDate;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Column names of the sales export
// ---------------------------------------------------------------------------

pub const DATE_COLUMN: &str = "Date";
pub const AMOUNT_COLUMN: &str = "Amount";
pub const CITY_COLUMN: &str = "ship-city";
pub const STATUS_COLUMN: &str = "Status";
pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";

// ---------------------------------------------------------------------------
// RawRecord – one row exactly as read from the file
// ---------------------------------------------------------------------------

/// A row before cleaning. Every cell is optional text; columns the export
/// does not have simply stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Option<String>,
    #[serde(rename = "ship-city")]
    pub city: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<String>,
}

// ---------------------------------------------------------------------------
// SalesRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A row that survived cleaning: date and amount are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub amount: f64,
    pub city: Option<String>,
    pub status: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Which of the optional columns the source header carried.
///
/// A missing column is different from a blank cell: charts built on an
/// absent column fail, while blank cells only skip the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPresence {
    pub city: bool,
    pub status: bool,
    pub coordinates: bool,
}

impl ColumnPresence {
    /// Inspect a header row. The returned flag is `false` when a required
    /// column (`Date` or `Amount`) is missing.
    pub fn from_headers<'a, I>(headers: I) -> (bool, Self)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut date = false;
        let mut amount = false;
        let mut latitude = false;
        let mut longitude = false;
        let mut presence = ColumnPresence {
            city: false,
            status: false,
            coordinates: false,
        };
        for h in headers {
            match h.trim() {
                DATE_COLUMN => date = true,
                AMOUNT_COLUMN => amount = true,
                CITY_COLUMN => presence.city = true,
                STATUS_COLUMN => presence.status = true,
                LATITUDE_COLUMN => latitude = true,
                LONGITUDE_COLUMN => longitude = true,
                _ => {}
            }
        }
        presence.coordinates = latitude && longitude;
        (date && amount, presence)
    }

    /// Every optional column present.
    #[cfg(test)]
    pub fn all() -> Self {
        ColumnPresence {
            city: true,
            status: true,
            coordinates: true,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset. Built once per load and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// Cleaned rows, in file order.
    pub records: Vec<SalesRecord>,
    /// Optional columns the source provided.
    pub columns: ColumnPresence,
}

impl SalesDataset {
    pub fn new(records: Vec<SalesRecord>, columns: ColumnPresence) -> Self {
        SalesDataset { records, columns }
    }

    /// Earliest and latest order date, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(
            self.records
                .iter()
                .fold((first, first), |(lo, hi), r| (lo.min(r.date), hi.max(r.date))),
        )
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, amount: f64) -> SalesRecord {
        SalesRecord {
            date: date.parse().unwrap(),
            amount,
            city: None,
            status: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn date_bounds_spans_unsorted_records() {
        let ds = SalesDataset::new(
            vec![
                record("2022-04-10", 1.0),
                record("2022-03-31", 2.0),
                record("2022-06-29", 3.0),
            ],
            ColumnPresence::all(),
        );
        let (lo, hi) = ds.date_bounds().unwrap();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2022, 3, 31).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2022, 6, 29).unwrap());
    }

    #[test]
    fn date_bounds_of_empty_dataset_is_none() {
        let ds = SalesDataset::new(Vec::new(), ColumnPresence::all());
        assert!(ds.date_bounds().is_none());
        assert!(ds.is_empty());
    }

    #[test]
    fn headers_detect_required_and_optional_columns() {
        let (ok, cols) =
            ColumnPresence::from_headers(["index", "Date", "Status", "Amount", "ship-city"]);
        assert!(ok);
        assert!(cols.city && cols.status);
        assert!(!cols.coordinates);

        let (ok, cols) = ColumnPresence::from_headers(["Date", "Latitude", "Longitude"]);
        assert!(!ok);
        assert!(cols.coordinates);
    }
}
