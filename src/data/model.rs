use std::collections::HashSet;
use std::fmt;

use crate::error::{EdaError, Result};

// ---------------------------------------------------------------------------
// Value – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Null,
}

// -- Manual Eq/Hash so distinct levels can be collected in a HashSet --

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` (numeric cells only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// DType – declared storage type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    /// Text values (and anything that failed numeric inference).
    Object,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// One named column. Every non-null value matches `dtype`.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Non-null numeric values in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Distinct non-null values in order of first appearance.
    pub fn levels(&self) -> Vec<Value> {
        let mut seen = HashSet::new();
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded dataset
// ---------------------------------------------------------------------------

/// Rectangular, column-major table with unique column names.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, checking that lengths agree and names are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        let mut names = HashSet::new();
        for col in &columns {
            if col.len() != row_count {
                return Err(EdaError::Parse {
                    line: 0,
                    message: format!(
                        "column '{}' has {} rows, expected {row_count}",
                        col.name,
                        col.len()
                    ),
                });
            }
            if !names.insert(col.name.as_str()) {
                return Err(EdaError::Parse {
                    line: 1,
                    message: format!("duplicate column name '{}'", col.name),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EdaError::ColumnNotFound {
                column: name.to_string(),
                available: self.column_names(),
            })
    }

    /// Look up a column that must hold integers or reals.
    pub fn numeric_column(&self, name: &str) -> Result<&Column> {
        let col = self.column(name)?;
        if !col.dtype.is_numeric() {
            return Err(EdaError::WrongColumnType {
                column: name.to_string(),
                expected: "int64 or float64",
                actual: col.dtype,
            });
        }
        Ok(col)
    }
}
