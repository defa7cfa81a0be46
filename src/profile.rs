//! Dataset overview: shape, head preview, per-column info, summary
//! statistics and missing-value counts.
//!
//! Tables are printed through arrow's pretty printer so every section lines
//! up the same way.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::model::{Column, DType, Table, Value};
use crate::error::Result;
use crate::stats::Describe;

/// Per-column declared type and non-null count.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: DType,
}

/// Everything the overview prints, computed in one pass over the table.
#[derive(Debug, Clone)]
pub struct Profile {
    pub rows: usize,
    pub columns: usize,
    /// First rows of every column.
    pub head: Vec<Column>,
    pub info: Vec<ColumnInfo>,
    /// Summary statistics of numerical columns, in table order.
    pub describe: Vec<(String, Describe)>,
    pub missing: Vec<(String, usize)>,
}

/// Build the overview of `table`, previewing `head_rows` rows.
pub fn profile(table: &Table, head_rows: usize) -> Profile {
    let head = table
        .columns()
        .iter()
        .map(|c| {
            let values = c.values.iter().take(head_rows).cloned().collect();
            Column::new(c.name.clone(), c.dtype, values)
        })
        .collect();

    let info = table
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            non_null: c.non_null_count(),
            dtype: c.dtype,
        })
        .collect();

    let describe = table
        .columns()
        .iter()
        .filter(|c| c.dtype.is_numeric())
        .map(|c| (c.name.clone(), Describe::of(&c.numeric_values())))
        .collect();

    let missing = table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .collect();

    Profile {
        rows: table.row_count(),
        columns: table.column_count(),
        head,
        info,
        describe,
        missing,
    }
}

impl Profile {
    /// Render all sections in report order.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "\n----- Dataset Shape -----");
        let _ = writeln!(out, "({}, {})", self.rows, self.columns);

        let _ = writeln!(out, "\n----- Dataset Head -----");
        let _ = writeln!(out, "{}", pretty_format_batches(&[self.head_batch()?])?);

        let _ = writeln!(out, "\n----- Data Info -----");
        let end = self.rows.saturating_sub(1);
        let _ = writeln!(out, "RangeIndex: {} entries, 0 to {end}", self.rows);
        let _ = writeln!(out, "Data columns (total {} columns):", self.columns);
        let _ = writeln!(out, "{}", pretty_format_batches(&[self.info_batch()?])?);
        let _ = writeln!(out, "dtypes: {}", self.dtype_summary());

        let _ = writeln!(out, "\n----- Summary Statistics -----");
        if self.describe.is_empty() {
            let _ = writeln!(out, "No numerical columns to describe.");
        } else {
            let _ = writeln!(out, "{}", pretty_format_batches(&[self.describe_batch()?])?);
        }

        let _ = writeln!(out, "\n----- Missing Values -----");
        let _ = write!(out, "{}", pretty_format_batches(&[self.missing_batch()?])?);
        Ok(out)
    }

    pub fn print(&self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }

    /// e.g. `float64(2), object(1)`.
    pub fn dtype_summary(&self) -> String {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for info in &self.info {
            *counts.entry(info.dtype.to_string()).or_default() += 1;
        }
        counts
            .iter()
            .map(|(dtype, n)| format!("{dtype}({n})"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn head_batch(&self) -> Result<RecordBatch> {
        let n = self.head.first().map_or(0, Column::len);
        let mut fields = vec![Field::new("", DataType::UInt64, false)];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(UInt64Array::from_iter_values(0..n as u64))];
        for col in &self.head {
            let (data_type, array) = column_array(col);
            fields.push(Field::new(col.name.as_str(), data_type, true));
            arrays.push(array);
        }
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    fn info_batch(&self) -> Result<RecordBatch> {
        let schema = Schema::new(vec![
            Field::new("#", DataType::UInt64, false),
            Field::new("Column", DataType::Utf8, false),
            Field::new("Non-Null Count", DataType::Utf8, false),
            Field::new("Dtype", DataType::Utf8, false),
        ]);
        let idx = UInt64Array::from_iter_values(0..self.info.len() as u64);
        let names = StringArray::from_iter_values(self.info.iter().map(|i| i.name.as_str()));
        let counts =
            StringArray::from_iter_values(self.info.iter().map(|i| format!("{} non-null", i.non_null)));
        let dtypes = StringArray::from_iter_values(self.info.iter().map(|i| i.dtype.to_string()));
        Ok(RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(idx), Arc::new(names), Arc::new(counts), Arc::new(dtypes)],
        )?)
    }

    fn describe_batch(&self) -> Result<RecordBatch> {
        let labels = Describe::of(&[]).rows().map(|(label, _)| label);
        let mut fields = vec![Field::new("", DataType::Utf8, false)];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(labels))];
        for (name, d) in &self.describe {
            fields.push(Field::new(name.as_str(), DataType::Float64, false));
            let values = d.rows().map(|(_, v)| round6(v));
            arrays.push(Arc::new(Float64Array::from_iter_values(values)));
        }
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    fn missing_batch(&self) -> Result<RecordBatch> {
        let schema = Schema::new(vec![
            Field::new("Column", DataType::Utf8, false),
            Field::new("Missing", DataType::UInt64, false),
        ]);
        let names = StringArray::from_iter_values(self.missing.iter().map(|(n, _)| n.as_str()));
        let counts = UInt64Array::from_iter_values(self.missing.iter().map(|(_, c)| *c as u64));
        Ok(RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(names), Arc::new(counts)],
        )?)
    }
}

fn round6(v: f64) -> f64 {
    if v.is_finite() {
        (v * 1e6).round() / 1e6
    } else {
        v
    }
}

/// Convert a column to a nullable arrow array of its declared type.
fn column_array(col: &Column) -> (DataType, ArrayRef) {
    match col.dtype {
        DType::Int64 => {
            let values: Int64Array = col
                .values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
            (DataType::Int64, Arc::new(values))
        }
        DType::Float64 => {
            let values: Float64Array = col.values.iter().map(Value::as_f64).collect();
            (DataType::Float64, Arc::new(values))
        }
        DType::Bool => {
            let values: BooleanArray = col
                .values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            (DataType::Boolean, Arc::new(values))
        }
        DType::Object => {
            let values: StringArray = col
                .values
                .iter()
                .map(|v| match v {
                    Value::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            (DataType::Utf8, Arc::new(values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    #[test]
    fn missing_counts_match_empty_cells() {
        let table = parse_str("a,b,c\n1,x,\n,y,\n3,,\n4,w,5\n").unwrap();
        let p = profile(&table, 5);
        assert_eq!(
            p.missing,
            vec![("a".to_string(), 1), ("b".to_string(), 1), ("c".to_string(), 3)]
        );
    }

    #[test]
    fn describe_covers_numerical_columns_only() {
        let table = parse_str("n,t,f\n1,x,True\n2,y,False\n3,z,True\n").unwrap();
        let p = profile(&table, 5);
        assert_eq!(p.describe.len(), 1);
        let (name, d) = &p.describe[0];
        assert_eq!(name, "n");
        assert_eq!(d.count, 3);
        assert_eq!(d.mean, 2.0);
        assert_eq!(d.std, 1.0);
    }

    #[test]
    fn head_is_truncated() {
        let table = parse_str("a\n1\n2\n3\n4\n5\n6\n7\n").unwrap();
        let p = profile(&table, 5);
        assert_eq!(p.head[0].len(), 5);
        assert_eq!(p.rows, 7);
    }

    #[test]
    fn dtype_summary_is_sorted() {
        let table = parse_str("s,i,f,g\nx,1,1.5,2.5\n").unwrap();
        let p = profile(&table, 5);
        assert_eq!(p.dtype_summary(), "float64(2), int64(1), object(1)");
        assert_eq!(p.info[1].dtype, DType::Int64);
        assert_eq!(p.info[1].non_null, 1);
    }

    #[test]
    fn render_has_sections_in_order() {
        let table = parse_str("a,b\n1,x\n2,y\n,z").unwrap();
        let text = profile(&table, 5).render().unwrap();
        let order = [
            "Dataset Shape",
            "Dataset Head",
            "Data Info",
            "Summary Statistics",
            "Missing Values",
        ];
        let positions: Vec<usize> = order.iter().map(|h| text.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("(3, 2)"));
        assert!(text.contains("2 non-null"));
    }

    #[test]
    fn render_without_numerical_columns() {
        let table = parse_str("t\nx\ny\n").unwrap();
        let text = profile(&table, 5).render().unwrap();
        assert!(text.contains("No numerical columns"));
    }
}
