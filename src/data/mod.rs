/// Data layer: record types, loading/cleaning, and date filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  parse Date / Amount, drop bad rows → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  inclusive date range → FilteredView
///   └──────────┘
/// ```

pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
