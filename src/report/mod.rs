/// Filter-and-render pipeline: one date range in, four chart datasets out.
///
/// Every chart is computed on its own. A chart that fails becomes
/// [`ChartOutput::Failed`] and the other three are unaffected; an empty date
/// window short-circuits to four [`ChartOutput::Empty`] outputs.
pub mod aggregate;

use crate::data::filter::{DateRange, filter_by_date};
use crate::data::model::SalesDataset;

pub use aggregate::{ChartError, CityTotal, GeoPoint, StatusSlice, TOP_CITIES, TrendPoint};

// ---------------------------------------------------------------------------
// Per-chart result
// ---------------------------------------------------------------------------

/// Outcome of computing one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutput<T> {
    /// Data ready to plot (never an empty collection).
    Ready(T),
    /// Nothing to show for this window.
    Empty,
    /// The computation failed; the chart shows the placeholder.
    Failed(ChartError),
}

impl<T> ChartOutput<Vec<T>> {
    /// Wrap an aggregate result, logging failures under `chart`.
    fn from_result(chart: &str, result: Result<Vec<T>, ChartError>) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => ChartOutput::Empty,
            Ok(rows) => ChartOutput::Ready(rows),
            Err(e) => {
                log::warn!("{chart} chart unavailable: {e}");
                ChartOutput::Failed(e)
            }
        }
    }
}

impl<T> ChartOutput<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartOutput::Ready(data) => Some(data),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// The four display slots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub trend: ChartOutput<Vec<TrendPoint>>,
    pub city_ranking: ChartOutput<Vec<CityTotal>>,
    pub status_distribution: ChartOutput<Vec<StatusSlice>>,
    pub geo_points: ChartOutput<Vec<GeoPoint>>,
    /// Orders inside the window.
    pub matched_orders: usize,
}

impl ChartSet {
    /// Four placeholders.
    pub fn empty() -> Self {
        ChartSet {
            trend: ChartOutput::Empty,
            city_ranking: ChartOutput::Empty,
            status_distribution: ChartOutput::Empty,
            geo_points: ChartOutput::Empty,
            matched_orders: 0,
        }
    }
}

/// Filter `dataset` to `range` and build all four charts from scratch.
pub fn render(dataset: &SalesDataset, range: DateRange) -> ChartSet {
    let view = filter_by_date(dataset, range);
    log::debug!(
        "Rendering {} to {}: {} of {} orders",
        range.start,
        range.end,
        view.len(),
        dataset.len()
    );

    if view.is_empty() {
        return ChartSet::empty();
    }

    ChartSet {
        trend: ChartOutput::from_result("Sales trend", aggregate::sales_trend(&view)),
        city_ranking: ChartOutput::from_result(
            "Top cities",
            aggregate::top_cities(&view, TOP_CITIES),
        ),
        status_distribution: ChartOutput::from_result(
            "Status distribution",
            aggregate::status_distribution(&view),
        ),
        geo_points: ChartOutput::from_result("Sales map", aggregate::geo_points(&view)),
        matched_orders: view.len(),
    }
}
