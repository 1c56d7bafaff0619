use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Placeholder substituted for a missing author, institution or country.
pub const SENTINEL: &str = "Unknown";

pub const AUTHOR_COLUMN: &str = "authfull";
pub const INSTITUTION_COLUMN: &str = "inst_name";
pub const COUNTRY_COLUMN: &str = "cntry";

/// Columns every dataset version must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [AUTHOR_COLUMN, INSTITUTION_COLUMN, COUNTRY_COLUMN];

// Optional columns; their presence is feature-detected per dataset.
pub const RANK_COLUMN: &str = "rank (ns)";
pub const FIELD_COLUMN: &str = "sm-field";
pub const SUBFIELD_COLUMN: &str = "sm-subfield-1";
pub const SUBFIELD_RANK_COLUMN: &str = "rank sm-subfield-1";

/// Markers read as missing values, matching what Pandas treats as NaN on import.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// CellValue – a single cell in an optional column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Infer the type of a raw text cell.
    pub fn guess(raw: &str) -> Self {
        if NA_MARKERS.contains(&raw) {
            return CellValue::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return CellValue::Float(f);
        }
        match raw {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::String(raw.to_string()),
        }
    }

    /// Keep a raw text cell as text, only recognising missing-value markers.
    pub fn text(raw: &str) -> Self {
        if NA_MARKERS.contains(&raw) {
            CellValue::Null
        } else {
            CellValue::String(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Coerce to a number. Text that does not parse, booleans, NaN and nulls
    /// are all treated as missing.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Bool(_) | CellValue::Null => return None,
        };
        (!v.is_nan()).then_some(v)
    }
}

// ---------------------------------------------------------------------------
// AuthorRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single author (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRecord {
    /// `authfull`, or [`SENTINEL`] when missing.
    pub author: String,
    /// `inst_name`, or [`SENTINEL`] when missing.
    pub institution: String,
    /// `cntry` as found in the source (usually lowercase alpha-3), or [`SENTINEL`].
    pub country: String,
    /// Every other column: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl AuthorRecord {
    /// Build a record from a full row, moving the three required columns out
    /// of `cells` and substituting the sentinel for missing ones.
    pub fn from_cells(mut cells: BTreeMap<String, CellValue>) -> Self {
        let author = take_text(&mut cells, AUTHOR_COLUMN);
        let institution = take_text(&mut cells, INSTITUTION_COLUMN);
        let country = take_text(&mut cells, COUNTRY_COLUMN);
        AuthorRecord {
            author,
            institution,
            country,
            extra: cells,
        }
    }

    /// Categorical value of a column. Nulls in optional columns yield `None`
    /// so they drop out of groupings.
    pub fn category(&self, column: &str) -> Option<String> {
        match column {
            AUTHOR_COLUMN => Some(self.author.clone()),
            INSTITUTION_COLUMN => Some(self.institution.clone()),
            COUNTRY_COLUMN => Some(self.country.clone()),
            other => self
                .extra
                .get(other)
                .filter(|v| !v.is_null())
                .map(|v| v.to_string()),
        }
    }

    /// Numeric value of an optional column, coerced.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.extra.get(column).and_then(CellValue::as_f64)
    }

    /// Text shown in the results table.
    pub fn display(&self, column: &str) -> String {
        match column {
            AUTHOR_COLUMN => self.author.clone(),
            INSTITUTION_COLUMN => self.institution.clone(),
            COUNTRY_COLUMN => self.country.clone(),
            other => self.extra.get(other).map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

fn take_text(cells: &mut BTreeMap<String, CellValue>, column: &str) -> String {
    match cells.remove(column) {
        None | Some(CellValue::Null) => SENTINEL.to_string(),
        Some(CellValue::String(s)) if s.is_empty() => SENTINEL.to_string(),
        Some(CellValue::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// AuthorTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table: records in source order plus the header list.
#[derive(Debug, Clone, Default)]
pub struct AuthorTable {
    /// All authors (rows), in source order.
    pub records: Vec<AuthorRecord>,
    /// Column names in header order, required columns included.
    pub columns: Vec<String>,
}

impl AuthorTable {
    pub fn new(columns: Vec<String>, records: Vec<AuthorRecord>) -> Self {
        AuthorTable { records, columns }
    }

    /// The table shown after a failed load.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of authors.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the loaded schema carries `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}
