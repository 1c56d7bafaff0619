use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{AuthorRecord, AuthorTable, CellValue, REQUIRED_COLUMNS};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Source + errors
// ---------------------------------------------------------------------------

/// Where the author table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Remote CSV fetched over HTTP(S).
    Url(String),
    /// Local `.csv`, `.json` or `.parquet` file.
    File(PathBuf),
}

impl DataSource {
    /// Interpret a user-supplied location: anything with an http(s) scheme is
    /// a URL, everything else a path.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching data: {0}")]
    Http(#[from] reqwest::Error),
    #[error("reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("reading parquet batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("{0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the author table from `source`.
pub fn load_source(source: &DataSource) -> Result<AuthorTable, LoadError> {
    match source {
        DataSource::Url(url) => fetch_csv(url),
        DataSource::File(path) => load_file(path),
    }
}

/// Load the author table, degrading to an empty table on failure.
///
/// The second element is the message to show the user when loading failed.
pub fn load_or_empty(source: &DataSource) -> (AuthorTable, Option<String>) {
    match load_source(source) {
        Ok(table) => {
            log::info!(
                "Loaded {} authors from {source} with columns {:?}",
                table.len(),
                table.columns
            );
            (table, None)
        }
        Err(e) => {
            log::error!("Failed to load {source}: {e}");
            (AuthorTable::empty(), Some(format!("Error loading data: {e}")))
        }
    }
}

/// Load a local file.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<AuthorTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(std::fs::File::open(path)?),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

fn fetch_csv(url: &str) -> Result<AuthorTable, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let body = response.bytes()?;
    parse_csv(body.as_ref())
}

fn check_required(columns: &[String]) -> Result<(), LoadError> {
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse a headed CSV table.  Required columns stay text; every other column
/// is type-guessed cell by cell.  Short rows are padded with missing cells.
pub fn parse_csv<R: Read>(input: R) -> Result<AuthorTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    check_required(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let cells: BTreeMap<String, CellValue> = headers
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let raw = row.get(i).unwrap_or("");
                let value = if REQUIRED_COLUMNS.contains(&col.as_str()) {
                    CellValue::text(raw)
                } else {
                    CellValue::guess(raw)
                };
                (col.clone(), value)
            })
            .collect();
        records.push(AuthorRecord::from_cells(cells));
    }

    Ok(AuthorTable::new(headers, records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [ { "authfull": "Smith, John", "inst_name": "MIT", "cntry": "usa", "rank (ns)": 12 } ]
/// ```
fn load_json(path: &Path) -> Result<AuthorTable, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<AuthorTable, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;

        let mut cells = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            cells.insert(key.clone(), json_to_cell(val));
        }
        records.push(AuthorRecord::from_cells(cells));
    }

    check_required(&columns)?;
    Ok(AuthorTable::new(columns, records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one author per row.  Works with files written by
/// both Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<AuthorTable, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    check_required(&columns)?;

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let arrays = batch
            .columns()
            .iter()
            .map(normalize_column)
            .collect::<Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            let cells: BTreeMap<String, CellValue> = columns
                .iter()
                .zip(&arrays)
                .map(|(name, col)| (name.clone(), extract_cell(col, row)))
                .collect();
            records.push(AuthorRecord::from_cells(cells));
        }
    }

    Ok(AuthorTable::new(columns, records))
}

/// Cast columns [`extract_cell`] cannot read directly: narrow and unsigned
/// integers widen to Int64, Float16 to Float64, and everything else
/// (Utf8View, dictionaries, dates, ...) is rendered as Utf8.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => return Ok(Arc::clone(col)),
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 => DataType::Float64,
        _ => DataType::Utf8,
    };
    Ok(cast(col, &target)?)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::String(a.value(row).to_string()))
            .unwrap_or(CellValue::Null),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64))
            .unwrap_or(CellValue::Null),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64))
            .unwrap_or(CellValue::Null),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row)))
            .unwrap_or(CellValue::Null),
        // normalize_column leaves no other types behind
        _ => CellValue::Null,
    }
}
