use anyhow::{Context, Result};

/// The fixed `lock` value that marks a time sample as locked.
///
/// Compared with plain `==`; rows at 4999.98 or 5000.0 do not qualify.
pub const LOCK_SENTINEL: f64 = 4999.99;

pub const TIME_COLUMN: &str = "time";
pub const LOCK_COLUMN: &str = "lock";
pub const TEMPERATURE_COLUMN: &str = "temperature";

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell mirroring common spreadsheet dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text.
    Date(String),
    Null,
}

impl CellValue {
    /// Numeric view of the cell. Text, bools and nulls have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Numeric view with the spreadsheet convention that anything
    /// non-numeric reads as NaN.
    pub fn to_f64_or_nan(&self) -> f64 {
        self.as_f64().unwrap_or(f64::NAN)
    }
}

// ---------------------------------------------------------------------------
// Table – one tabular entry read out of an archive
// ---------------------------------------------------------------------------

/// A loaded table: ordered column names and row-major cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    /// Every row has `columns.len()` cells; short source rows are padded with `Null`.
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, padding or truncating each row to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact, case-sensitive name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .with_context(|| format!("table has no '{name}' column (columns: {:?})", self.columns))
    }

    /// A whole column as numbers, NaN where a cell is not numeric.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).map_or(f64::NAN, CellValue::to_f64_or_nan))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// One row of a lock table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockRecord {
    pub time: f64,
    pub lock: f64,
}

impl LockRecord {
    /// Exact comparison against [`LOCK_SENTINEL`].
    pub fn is_locked(&self) -> bool {
        self.lock == LOCK_SENTINEL
    }
}

/// One row of a temperature table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRecord {
    pub time: f64,
    pub temperature: f64,
}

/// Read the `time`/`lock` columns of a table as records.
pub fn lock_records(table: &Table) -> Result<Vec<LockRecord>> {
    let times = table.numeric_column(TIME_COLUMN)?;
    let locks = table.numeric_column(LOCK_COLUMN)?;
    Ok(times
        .into_iter()
        .zip(locks)
        .map(|(time, lock)| LockRecord { time, lock })
        .collect())
}

/// Read the `time`/`temperature` columns of a table as records.
pub fn temperature_records(table: &Table) -> Result<Vec<TemperatureRecord>> {
    let times = table.numeric_column(TIME_COLUMN)?;
    let temps = table.numeric_column(TEMPERATURE_COLUMN)?;
    Ok(times
        .into_iter()
        .zip(temps)
        .map(|(time, temperature)| TemperatureRecord { time, temperature })
        .collect())
}
