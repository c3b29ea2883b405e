use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::clean::LoadReport;
use crate::data::filter::DateRange;
use crate::data::model::SalesDataset;
use crate::report::{self, ChartSet};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Cleaned dataset; replaced wholesale when another file is opened.
    pub dataset: Arc<SalesDataset>,

    /// Cleaning summary for the current dataset.
    pub load_report: LoadReport,

    /// File the dataset came from.
    pub source: PathBuf,

    /// Date window currently selected in the picker.
    pub range: DateRange,

    /// Window spanning the whole dataset; the picker starts here.
    pub default_range: DateRange,

    /// Charts for `range`. `None` until the first frame asks for them.
    pub charts: Option<ChartSet>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// State for a freshly loaded dataset. `fallback` is the day used for
    /// the picker when the dataset has no rows.
    pub fn new(
        dataset: SalesDataset,
        load_report: LoadReport,
        source: PathBuf,
        fallback: NaiveDate,
    ) -> Self {
        let default_range = DateRange::covering(&dataset, fallback);
        Self {
            dataset: Arc::new(dataset),
            load_report,
            source,
            range: default_range,
            default_range,
            charts: None,
            status_message: None,
        }
    }

    /// Charts for the current range, rendering them on first use.
    pub fn charts(&mut self) -> &ChartSet {
        let dataset = &self.dataset;
        let range = self.range;
        self.charts
            .get_or_insert_with(|| report::render(dataset, range))
    }

    /// Select a new window and re-run the whole pipeline once.
    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
        self.charts = Some(report::render(&self.dataset, range));
    }

    /// Go back to the full-dataset window.
    pub fn reset_range(&mut self) {
        self.set_range(self.default_range);
    }

    /// Ingest a newly loaded dataset and start over from its full window.
    pub fn set_dataset(
        &mut self,
        dataset: SalesDataset,
        load_report: LoadReport,
        source: PathBuf,
        fallback: NaiveDate,
    ) {
        *self = Self::new(dataset, load_report, source, fallback);
    }

    /// Load another export. On failure the current dataset stays and the
    /// error is shown in the top bar.
    pub fn open_file(&mut self, path: &Path, fallback: NaiveDate) {
        match crate::data::loader::load_file(path) {
            Ok((dataset, report)) => {
                log::info!("Opened {} with {} orders", path.display(), dataset.len());
                self.set_dataset(dataset, report, path.to_path_buf(), fallback);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ColumnPresence, SalesRecord};
    use crate::report::ChartOutput;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state_with(days: &[u32]) -> AppState {
        let records = days
            .iter()
            .map(|&d| SalesRecord {
                date: ymd(2022, 6, d),
                amount: 10.0,
                city: Some("Pune".into()),
                status: Some("Shipped".into()),
                latitude: None,
                longitude: None,
            })
            .collect();
        let ds = SalesDataset::new(records, ColumnPresence::all());
        AppState::new(
            ds,
            LoadReport::default(),
            PathBuf::from("sales.csv"),
            ymd(2026, 10, 17),
        )
    }

    #[test]
    fn starts_on_the_full_window_without_charts() {
        let state = state_with(&[5, 1, 20]);
        assert_eq!(state.range, DateRange::new(ymd(2022, 6, 1), ymd(2022, 6, 20)));
        assert!(state.charts.is_none());
    }

    #[test]
    fn first_request_renders_the_default_window() {
        let mut state = state_with(&[5, 1, 20]);
        assert_eq!(state.charts().matched_orders, 3);
        assert!(state.charts.is_some());
    }

    #[test]
    fn range_change_rerenders_and_reset_restores() {
        let mut state = state_with(&[1, 2, 3]);
        state.set_range(DateRange::new(ymd(2022, 6, 3), ymd(2022, 6, 30)));
        assert_eq!(state.charts().matched_orders, 1);

        state.set_range(DateRange::new(ymd(2023, 1, 1), ymd(2023, 1, 2)));
        assert_eq!(state.charts().trend, ChartOutput::Empty);

        state.reset_range();
        assert_eq!(state.range, state.default_range);
        assert_eq!(state.charts().matched_orders, 3);
    }

    #[test]
    fn empty_dataset_uses_the_fallback_day() {
        let mut state = state_with(&[]);
        assert_eq!(state.range, DateRange::new(ymd(2026, 10, 17), ymd(2026, 10, 17)));
        assert_eq!(*state.charts(), ChartSet::empty());
    }

    #[test]
    fn failed_open_keeps_the_current_dataset() {
        let mut state = state_with(&[1, 2]);
        state.open_file(Path::new("/nonexistent/report.csv"), ymd(2026, 10, 17));
        assert_eq!(state.dataset.len(), 2);
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }
}
