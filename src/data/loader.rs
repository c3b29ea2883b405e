use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::clean::{LoadReport, clean_records, decode_latin1};
use super::model::{
    AMOUNT_COLUMN, CITY_COLUMN, ColumnPresence, DATE_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN,
    RawRecord, STATUS_COLUMN, SalesDataset,
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a sales export.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – header row, Latin-1 text (the usual export)
/// * `.json`         – `[{ "Date": ..., "Amount": ..., ... }, ...]`
/// * `.parquet`      – any column types; cells are rendered to text first
///
/// Rows whose date or amount cannot be parsed are dropped. Anything that
/// prevents reading the file as a whole is an error.
pub fn load_file(path: &Path) -> Result<(SalesDataset, LoadReport)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (raw, columns) = match ext.as_str() {
        "csv" | "txt" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let (dataset, report) = clean_records(raw, columns);
    log::info!(
        "Loaded {}: {} rows, {} kept ({} bad dates, {} bad amounts)",
        path.display(),
        report.total_rows,
        report.kept_rows,
        report.invalid_dates,
        report.invalid_amounts
    );
    if dataset.is_empty() {
        log::warn!("No usable rows in {}", path.display());
    }
    Ok((dataset, report))
}

/// Fail unless the header carried both required columns.
fn require_columns<'a, I>(headers: I) -> Result<ColumnPresence>
where
    I: IntoIterator<Item = &'a str>,
{
    let (complete, columns) = ColumnPresence::from_headers(headers);
    if !complete {
        bail!("missing required '{DATE_COLUMN}' or '{AMOUNT_COLUMN}' column");
    }
    Ok(columns)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<(Vec<RawRecord>, ColumnPresence)> {
    let bytes = std::fs::read(path).context("reading CSV file")?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    read_csv_text(&decode_latin1(body))
}

/// Parse already-decoded CSV text. Rows may be ragged; missing trailing
/// cells read as blank.
fn read_csv_text(text: &str) -> Result<(Vec<RawRecord>, ColumnPresence)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("reading CSV headers")?.clone();
    let columns = require_columns(headers.iter())?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(row);
    }
    Ok((rows, columns))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "04-30-22", "Amount": 647.62, "ship-city": "MUMBAI", "Status": "Shipped" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<(Vec<RawRecord>, ColumnPresence)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        objects.push(obj);
    }

    let keys = objects.iter().flat_map(|obj| obj.keys().map(String::as_str));
    let columns = require_columns(keys)?;

    let rows = objects
        .into_iter()
        .map(|obj| RawRecord {
            date: json_cell(obj, DATE_COLUMN),
            amount: json_cell(obj, AMOUNT_COLUMN),
            city: json_cell(obj, CITY_COLUMN),
            status: json_cell(obj, STATUS_COLUMN),
            latitude: json_cell(obj, LATITUDE_COLUMN),
            longitude: json_cell(obj, LONGITUDE_COLUMN),
        })
        .collect();
    Ok((rows, columns))
}

fn json_cell(obj: &Map<String, JsonValue>, key: &str) -> Option<String> {
    match obj.get(key)? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`); date, numeric
/// and string columns are all accepted because every cell is formatted to
/// text and cleaned like a CSV cell.
fn load_parquet(path: &Path) -> Result<(Vec<RawRecord>, ColumnPresence)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let columns = require_columns(schema.fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build().context("building parquet reader")?;

    let options = FormatOptions::default();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let date = column_formatter(&batch, DATE_COLUMN, &options)?;
        let amount = column_formatter(&batch, AMOUNT_COLUMN, &options)?;
        let city = column_formatter(&batch, CITY_COLUMN, &options)?;
        let status = column_formatter(&batch, STATUS_COLUMN, &options)?;
        let latitude = column_formatter(&batch, LATITUDE_COLUMN, &options)?;
        let longitude = column_formatter(&batch, LONGITUDE_COLUMN, &options)?;

        for row in 0..batch.num_rows() {
            rows.push(RawRecord {
                date: parquet_cell(&date, row),
                amount: parquet_cell(&amount, row),
                city: parquet_cell(&city, row),
                status: parquet_cell(&status, row),
                latitude: parquet_cell(&latitude, row),
                longitude: parquet_cell(&longitude, row),
            });
        }
    }

    Ok((rows, columns))
}

/// Formatter for one named column; absent columns yield `None`.
fn column_formatter<'a>(
    batch: &'a RecordBatch,
    name: &str,
    options: &FormatOptions<'a>,
) -> Result<Option<(&'a dyn Array, ArrayFormatter<'a>)>> {
    let Ok(idx) = batch.schema().index_of(name) else {
        return Ok(None);
    };
    let col = batch.column(idx).as_ref();
    let fmt = ArrayFormatter::try_new(col, options)
        .with_context(|| format!("formatting parquet column '{name}'"))?;
    Ok(Some((col, fmt)))
}

fn parquet_cell(column: &Option<(&dyn Array, ArrayFormatter<'_>)>, row: usize) -> Option<String> {
    let (array, fmt) = column.as_ref()?;
    if array.is_null(row) {
        return None;
    }
    Some(fmt.value(row).to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn temp_file(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn csv_rows_are_cleaned_in_file_order() {
        let file = temp_file(
            ".csv",
            b"index,Order ID,Date,Status,Amount,ship-city,Latitude,Longitude\n\
              0,A1,04-30-22,Shipped,647.62,MUMBAI,19.07,72.87\n\
              1,A2,04-30-22,Cancelled,N/A,DELHI,28.61,77.20\n\
              2,A3,bogus,Shipped,100,PUNE,18.52,73.85\n\
              3,A4,05-01-22,Shipped,\"1,200\",BENGALURU,12.97,77.59\n",
        );

        let (ds, report) = load_file(file.path()).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.invalid_amounts, 1);
        assert_eq!(report.invalid_dates, 1);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].city.as_deref(), Some("MUMBAI"));
        assert_eq!(ds.records[1].amount, 1200.0);
        assert_eq!(ds.columns, ColumnPresence::all());
    }

    #[test]
    fn csv_is_read_as_latin1() {
        let file = temp_file(
            ".csv",
            b"Date,Amount,ship-city,Status\n2022-01-01,10,Gen\xe8ve,Shipped\n",
        );
        let (ds, _) = load_file(file.path()).unwrap();
        assert_eq!(ds.records[0].city.as_deref(), Some("Genève"));
        assert!(!ds.columns.coordinates);
    }

    #[test]
    fn csv_bom_and_padded_headers_are_tolerated() {
        let file = temp_file(".csv", b"\xEF\xBB\xBF Date , Amount \n2022-01-01,5\n");
        let (ds, _) = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].amount, 5.0);
    }

    #[test]
    fn ragged_rows_read_missing_cells_as_blank() {
        let file = temp_file(
            ".csv",
            b"Date,Amount,ship-city,Status\n2022-01-01,5\n2022-01-02,7,PUNE,Shipped\n",
        );
        let (ds, _) = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].city, None);
        assert_eq!(ds.records[1].status.as_deref(), Some("Shipped"));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let file = temp_file(".csv", b"Date,ship-city\n2022-01-01,PUNE\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("missing required"));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_file(Path::new("/nonexistent/Amazon Sale Report.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("reading CSV file"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = temp_file(".xlsx", b"");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn json_records_accept_numbers_and_nulls() {
        let file = temp_file(
            ".json",
            br#"[
                {"Date": "2022-01-01", "Amount": 100, "ship-city": "Mumbai", "Status": "Shipped", "Latitude": 19.07, "Longitude": 72.87},
                {"Date": "2022-01-02", "Amount": null, "ship-city": "Delhi", "Status": "Shipped", "Latitude": null, "Longitude": null},
                {"Date": "2022-01-03", "Amount": "75.5", "ship-city": null, "Status": "Pending", "Latitude": null, "Longitude": null}
            ]"#,
        );
        let (ds, report) = load_file(file.path()).unwrap();
        assert_eq!(report.invalid_amounts, 1);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].amount, 100.0);
        assert_eq!(ds.records[0].latitude, Some(19.07));
        assert_eq!(ds.records[1].amount, 75.5);
        assert_eq!(ds.records[1].city, None);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let file = temp_file(".json", br#"{"Date": "2022-01-01"}"#);
        assert!(load_file(file.path()).is_err());
        let file = temp_file(".json", br#"[1, 2]"#);
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn parquet_columns_are_cleaned_like_text() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Date", DataType::Utf8, true),
            Field::new("Amount", DataType::Float64, true),
            Field::new("ship-city", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("2022-01-01"), Some("2022-01-02"), None])),
                Arc::new(Float64Array::from(vec![Some(10.5), None, Some(3.0)])),
                Arc::new(StringArray::from(vec![Some("Mumbai"), Some("Delhi"), Some("Pune")])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let (ds, report) = load_file(file.path()).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].amount, 10.5);
        assert_eq!(ds.records[0].city.as_deref(), Some("Mumbai"));
        assert!(ds.columns.city);
        assert!(!ds.columns.status);
    }
}
