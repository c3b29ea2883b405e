use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::filter::FilteredView;
use crate::data::model::{CITY_COLUMN, SalesRecord, STATUS_COLUMN};

/// How many cities the ranking keeps.
pub const TOP_CITIES: usize = 10;

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// Daily sales total.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityTotal {
    pub city: String,
    pub amount: f64,
}

/// One pie slice: summed amount of every order with this status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSlice {
    pub status: String,
    pub amount: f64,
    pub orders: usize,
}

/// One map marker per order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub amount: f64,
    pub city: Option<String>,
    pub status: Option<String>,
}

/// Why a single chart could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("source has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("sum for '{key}' is not a finite number")]
    NonFiniteTotal { key: String },
    #[error("slice total {total} is not positive")]
    NonPositiveTotal { total: f64 },
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Group by a text label in first-encounter order, summing amounts and
/// counting records. Records without a label are skipped.
fn sum_by_label<'a, F>(records: &[&'a SalesRecord], label: F) -> Result<Vec<(String, f64, usize)>, ChartError>
where
    F: Fn(&'a SalesRecord) -> Option<&'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for &r in records {
        let Some(key) = label(r) else {
            continue;
        };
        match index.get(key) {
            Some(&i) => {
                groups[i].1 += r.amount;
                groups[i].2 += 1;
            }
            None => {
                index.insert(key, groups.len());
                groups.push((key.to_string(), r.amount, 1));
            }
        }
    }
    if let Some((key, _, _)) = groups.iter().find(|g| !g.1.is_finite()) {
        return Err(ChartError::NonFiniteTotal { key: key.clone() });
    }
    Ok(groups)
}

// ---------------------------------------------------------------------------
// The four aggregates
// ---------------------------------------------------------------------------

/// Sum of amount per distinct date, ascending by date.
pub fn sales_trend(view: &FilteredView<'_>) -> Result<Vec<TrendPoint>, ChartError> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in &view.records {
        *by_date.entry(r.date).or_insert(0.0) += r.amount;
    }
    by_date
        .into_iter()
        .map(|(date, amount)| {
            if amount.is_finite() {
                Ok(TrendPoint { date, amount })
            } else {
                Err(ChartError::NonFiniteTotal {
                    key: date.to_string(),
                })
            }
        })
        .collect()
}

/// The `limit` cities with the largest summed amount, largest first.
/// Equal totals keep the order in which the cities were first seen.
pub fn top_cities(view: &FilteredView<'_>, limit: usize) -> Result<Vec<CityTotal>, ChartError> {
    if !view.columns.city {
        return Err(ChartError::MissingColumn(CITY_COLUMN));
    }
    let mut totals: Vec<CityTotal> = sum_by_label(&view.records, |r| r.city.as_deref())?
        .into_iter()
        .map(|(city, amount, _)| CityTotal { city, amount })
        .collect();
    // `sort_by` is stable, which keeps ties in encounter order.
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals.truncate(limit);
    Ok(totals)
}

/// Summed amount per order status, largest slice first.
pub fn status_distribution(view: &FilteredView<'_>) -> Result<Vec<StatusSlice>, ChartError> {
    if !view.columns.status {
        return Err(ChartError::MissingColumn(STATUS_COLUMN));
    }
    let mut slices: Vec<StatusSlice> = sum_by_label(&view.records, |r| r.status.as_deref())?
        .into_iter()
        .map(|(status, amount, orders)| StatusSlice {
            status,
            amount,
            orders,
        })
        .collect();
    if slices.is_empty() {
        return Ok(slices);
    }
    let total: f64 = slices.iter().map(|s| s.amount).sum();
    if total <= 0.0 {
        return Err(ChartError::NonPositiveTotal { total });
    }
    slices.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    Ok(slices)
}

/// One point per order that carries both coordinates.
pub fn geo_points(view: &FilteredView<'_>) -> Result<Vec<GeoPoint>, ChartError> {
    if !view.columns.coordinates {
        return Err(ChartError::MissingColumn("Latitude/Longitude"));
    }
    Ok(view
        .records
        .iter()
        .filter_map(|r| {
            Some(GeoPoint {
                latitude: r.latitude?,
                longitude: r.longitude?,
                amount: r.amount,
                city: r.city.clone(),
                status: r.status.clone(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnPresence;

    fn rec(day: u32, amount: f64, city: Option<&str>, status: Option<&str>) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2022, 5, day).unwrap(),
            amount,
            city: city.map(str::to_string),
            status: status.map(str::to_string),
            latitude: None,
            longitude: None,
        }
    }

    fn view(records: &[SalesRecord], columns: ColumnPresence) -> FilteredView<'_> {
        FilteredView {
            records: records.iter().collect(),
            columns,
        }
    }

    #[test]
    fn trend_sums_each_day_in_date_order() {
        let records = vec![
            rec(3, 10.0, None, None),
            rec(1, 5.0, None, None),
            rec(3, 2.5, None, None),
        ];
        let trend = sales_trend(&view(&records, ColumnPresence::all())).unwrap();
        let dates: Vec<u32> = trend.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
        assert_eq!(dates, vec![1, 3]);
        assert_eq!(trend[1].amount, 12.5);
    }

    #[test]
    fn trend_fails_on_overflowing_sum() {
        let records = vec![rec(1, f64::MAX, None, None), rec(1, f64::MAX, None, None)];
        let err = sales_trend(&view(&records, ColumnPresence::all())).unwrap_err();
        assert_eq!(
            err,
            ChartError::NonFiniteTotal {
                key: "2022-05-01".to_string()
            }
        );
    }

    #[test]
    fn city_ranking_keeps_ten_largest_with_stable_ties() {
        let mut records = Vec::new();
        for i in 0..12 {
            records.push(rec(1, 100.0 + i as f64, Some(&format!("City{i}")), None));
        }
        // Two late ties with the same total as City0.
        records.push(rec(2, 100.0, Some("TieB"), None));
        records.push(rec(2, 100.0, Some("TieA"), None));

        let ranking = top_cities(&view(&records, ColumnPresence::all()), TOP_CITIES).unwrap();
        assert_eq!(ranking.len(), 10);
        assert_eq!(ranking[0].city, "City11");
        assert!(ranking.windows(2).all(|w| w[0].amount >= w[1].amount));

        let all = top_cities(&view(&records, ColumnPresence::all()), usize::MAX).unwrap();
        let tail: Vec<&str> = all[all.len() - 3..].iter().map(|c| c.city.as_str()).collect();
        assert_eq!(tail, vec!["City0", "TieB", "TieA"]);
    }

    #[test]
    fn city_ranking_skips_unlabelled_records() {
        let records = vec![
            rec(1, 500.0, None, None),
            rec(1, 20.0, Some("Pune"), None),
        ];
        let ranking = top_cities(&view(&records, ColumnPresence::all()), TOP_CITIES).unwrap();
        assert_eq!(
            ranking,
            vec![CityTotal {
                city: "Pune".into(),
                amount: 20.0
            }]
        );
    }

    #[test]
    fn city_ranking_needs_the_column() {
        let records = vec![rec(1, 20.0, None, None)];
        let columns = ColumnPresence {
            city: false,
            ..ColumnPresence::all()
        };
        assert_eq!(
            top_cities(&view(&records, columns), TOP_CITIES),
            Err(ChartError::MissingColumn("ship-city"))
        );
    }

    #[test]
    fn status_slices_are_weighted_by_amount() {
        let records = vec![
            rec(1, 10.0, None, Some("Pending")),
            rec(1, 300.0, None, Some("Shipped")),
            rec(2, 0.0, None, Some("Cancelled")),
            rec(2, 40.0, None, Some("Pending")),
            rec(2, 99.0, None, None),
        ];
        let slices = status_distribution(&view(&records, ColumnPresence::all())).unwrap();
        assert_eq!(
            slices,
            vec![
                StatusSlice {
                    status: "Shipped".into(),
                    amount: 300.0,
                    orders: 1
                },
                StatusSlice {
                    status: "Pending".into(),
                    amount: 50.0,
                    orders: 2
                },
                StatusSlice {
                    status: "Cancelled".into(),
                    amount: 0.0,
                    orders: 1
                },
            ]
        );
    }

    #[test]
    fn status_distribution_rejects_zero_total() {
        let records = vec![rec(1, 0.0, None, Some("Cancelled"))];
        assert_eq!(
            status_distribution(&view(&records, ColumnPresence::all())),
            Err(ChartError::NonPositiveTotal { total: 0.0 })
        );
    }

    #[test]
    fn status_distribution_without_labels_is_empty() {
        let records = vec![rec(1, 10.0, None, None)];
        let slices = status_distribution(&view(&records, ColumnPresence::all())).unwrap();
        assert!(slices.is_empty());
    }

    #[test]
    fn geo_points_skip_records_without_coordinates() {
        let mut with = rec(1, 10.0, Some("Mumbai"), Some("Shipped"));
        with.latitude = Some(19.07);
        with.longitude = Some(72.87);
        let mut half = rec(1, 20.0, Some("Delhi"), None);
        half.latitude = Some(28.6);
        let records = vec![with, half, rec(2, 5.0, None, None)];

        let points = geo_points(&view(&records, ColumnPresence::all())).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].city.as_deref(), Some("Mumbai"));
        assert_eq!(points[0].status.as_deref(), Some("Shipped"));
        assert_eq!(points[0].amount, 10.0);
    }

    #[test]
    fn geo_points_need_coordinate_columns() {
        let records = vec![rec(1, 10.0, None, None)];
        let columns = ColumnPresence {
            coordinates: false,
            ..ColumnPresence::all()
        };
        assert!(matches!(
            geo_points(&view(&records, columns)),
            Err(ChartError::MissingColumn(_))
        ));
    }
}
