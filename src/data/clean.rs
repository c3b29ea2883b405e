// Cleaning of raw cells into typed values.
//
// Everything that deals with messy export text lives here so the rest of the
// crate only ever sees `SalesRecord`s with a real date and a finite amount.
use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{ColumnPresence, RawRecord, SalesDataset, SalesRecord};

/// Date-only layouts, tried in order. Two-digit years go first: `%Y` accepts
/// short years, so `04-30-22` would otherwise become year 22.
const DATE_FORMATS: [&str; 10] = [
    "%m-%d-%y",
    "%m/%d/%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time layouts; the time part is discarded.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

const CURRENCY_MARKERS: [&str; 7] = ["₹", "$", "€", "£", "INR", "Rs.", "Rs"];

// ---------------------------------------------------------------------------
// Load summary
// ---------------------------------------------------------------------------

/// What happened while cleaning a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub invalid_dates: usize,
    pub invalid_amounts: usize,
    pub kept_rows: usize,
}

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

/// Trim a cell and treat blank text as missing.
fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a calendar date from the handful of layouts sales exports use.
///
/// Month-first is assumed for ambiguous numeric dates. Returns `None` for
/// anything unrecognised instead of failing.
pub fn parse_date_lenient(s: Option<&str>) -> Option<NaiveDate> {
    let s = non_blank(s)?;
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Parse a monetary amount, tolerating thousands separators, padding and a
/// currency marker on either side of the sign. Non-finite results count as
/// missing, as does anything else that is not a plain number.
pub fn parse_amount(s: Option<&str>) -> Option<f64> {
    let s = non_blank(s)?;
    let value = match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            let (negative, unsigned) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s.strip_prefix('+').unwrap_or(s)),
            };
            let mut body = unsigned.trim_start();
            for marker in CURRENCY_MARKERS {
                if let Some(rest) = body.strip_prefix(marker) {
                    body = rest;
                    break;
                }
            }
            let body = body.trim();
            // "-$-5" has two signs.
            if negative && body.starts_with(['-', '+']) {
                return None;
            }
            let v = strip_thousands(body)?.parse::<f64>().ok()?;
            if negative { -v } else { v }
        }
    };
    value.is_finite().then_some(value)
}

/// Remove thousands commas from `body`. Commas must split the integer part
/// into a 1-3 digit lead and groups of exactly three; otherwise the text is
/// rejected rather than guessed at (`12,5` is not 125).
fn strip_thousands(body: &str) -> Option<String> {
    if !body.contains(',') {
        return Some(body.to_string());
    }
    let (int_part, frac) = match body.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (body, None),
    };
    let int_part = int_part.strip_prefix(['-', '+']).unwrap_or(int_part);
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let mut groups = int_part.split(',');
    let lead = groups.next()?;
    if !(1..=3).contains(&lead.len()) || !all_digits(lead) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && all_digits(g)) {
        return None;
    }
    if frac.is_some_and(|f| f.contains(',')) {
        return None;
    }
    Some(body.replace(',', ""))
}

/// Parse an optional coordinate cell.
pub fn parse_coordinate(s: Option<&str>) -> Option<f64> {
    non_blank(s)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Decode ISO-8859-1 text. Every byte is a valid code point, so this never
/// fails.
pub fn decode_latin1(bytes: &[u8]) -> Cow<'_, str> {
    encoding_rs::mem::decode_latin1(bytes)
}

fn label(s: Option<String>) -> Option<String> {
    non_blank(s.as_deref()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Row cleaning
// ---------------------------------------------------------------------------

/// Turn raw rows into the cleaned dataset.
///
/// Rows with an unparseable date are dropped first, then rows with an
/// unparseable amount. Surviving rows keep their file order.
pub fn clean_records(raw: Vec<RawRecord>, columns: ColumnPresence) -> (SalesDataset, LoadReport) {
    let mut report = LoadReport {
        total_rows: raw.len(),
        ..LoadReport::default()
    };

    let mut records = Vec::with_capacity(raw.len());
    for row in raw {
        let Some(date) = parse_date_lenient(row.date.as_deref()) else {
            report.invalid_dates += 1;
            continue;
        };
        let Some(amount) = parse_amount(row.amount.as_deref()) else {
            report.invalid_amounts += 1;
            continue;
        };
        records.push(SalesRecord {
            date,
            amount,
            latitude: parse_coordinate(row.latitude.as_deref()),
            longitude: parse_coordinate(row.longitude.as_deref()),
            city: label(row.city),
            status: label(row.status),
        });
    }

    report.kept_rows = records.len();
    (SalesDataset::new(records, columns), report)
}
