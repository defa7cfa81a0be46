use std::collections::HashSet;
use std::path::Path;

use crate::error::{EdaError, Result};

use super::model::{Column, DType, Table, Value};

/// Cell texts treated as missing, matching the common dataframe defaults.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_MARKERS: &[&str] = &["True", "true", "TRUE"];
const FALSE_MARKERS: &[&str] = &["False", "false", "FALSE"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a comma-separated file with a header row into a [`Table`].
pub fn load_csv(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path).map_err(|source| EdaError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() as u64 + 1;
        EdaError::Parse {
            line,
            message: "file is not valid UTF-8".to_string(),
        }
    })?;

    let table = parse_str(&text)?;
    println!("Data loaded successfully.");
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Parse CSV text (header row first) into a [`Table`].
pub fn parse_str(input: &str) -> Result<Table> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if raw_headers.is_empty() || (raw_headers.len() == 1 && raw_headers[0].is_empty()) {
        return Err(EdaError::Parse {
            line: 1,
            message: "no columns to parse from file".to_string(),
        });
    }
    let headers = unique_headers(raw_headers);
    let n_cols = headers.len();

    // Column-major raw cells; `None` marks padding for short rows.
    let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];

    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() == 1 && record[0].trim().is_empty() && n_cols > 1 {
            continue; // blank line
        }
        if record.len() > n_cols {
            return Err(EdaError::Parse {
                line,
                message: format!("expected {n_cols} fields, saw {}", record.len()),
            });
        }
        for (col_idx, raw) in raw_columns.iter_mut().enumerate() {
            raw.push(record.get(col_idx).map(str::to_string));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| build_column(name, &raw))
        .collect();
    Table::new(columns)
}

fn csv_error(err: csv::Error) -> EdaError {
    let line = err.position().map_or(0, |p| p.line());
    EdaError::Parse {
        line,
        message: err.to_string(),
    }
}

/// Rename duplicates `a` → `a.1`, `a.2` and blanks → `Unnamed: {idx}`.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut suffix = 1;
            while seen.contains(&candidate) {
                candidate = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

fn is_null(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    if TRUE_MARKERS.contains(&cell) {
        Some(true)
    } else if FALSE_MARKERS.contains(&cell) {
        Some(false)
    } else {
        None
    }
}

/// Pick the most specific dtype that fits every non-null cell.
fn infer_dtype(cells: &[Option<&str>]) -> DType {
    let non_null: Vec<&str> = cells.iter().flatten().copied().collect();
    let has_nulls = non_null.len() < cells.len();

    if non_null.is_empty() {
        return DType::Float64;
    }
    if non_null.iter().all(|s| s.parse::<i64>().is_ok()) {
        return if has_nulls { DType::Float64 } else { DType::Int64 };
    }
    if non_null.iter().all(|s| s.parse::<f64>().is_ok()) {
        return DType::Float64;
    }
    if !has_nulls && non_null.iter().all(|s| parse_bool(s).is_some()) {
        return DType::Bool;
    }
    DType::Object
}

fn build_column(name: String, raw: &[Option<String>]) -> Column {
    // Normalise: trimmed text, `None` for nulls and padding.
    let cells: Vec<Option<&str>> = raw
        .iter()
        .map(|c| c.as_deref().map(str::trim).filter(|s| !is_null(s)))
        .collect();
    let dtype = infer_dtype(&cells);

    let values = cells
        .iter()
        .map(|cell| match (cell, dtype) {
            (None, _) => Value::Null,
            (Some(s), DType::Int64) => s.parse().map_or(Value::Null, Value::Integer),
            (Some(s), DType::Float64) => s.parse().map_or(Value::Null, Value::Float),
            (Some(s), DType::Bool) => parse_bool(s).map_or(Value::Null, Value::Bool),
            (Some(s), DType::Object) => Value::Text((*s).to_string()),
        })
        .collect();

    Column::new(name, dtype, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_three_rows_with_missing_number() {
        let table = parse_str("a,b\n1,x\n2,y\n,z").unwrap();
        assert_eq!(table.row_count(), 3);

        let a = table.column("a").unwrap();
        assert_eq!(a.dtype, DType::Float64);
        assert_eq!(a.null_count(), 1);

        let b = table.column("b").unwrap();
        assert_eq!(b.dtype, DType::Object);
        assert_eq!(b.null_count(), 0);
    }

    #[test]
    fn row_count_matches_data_lines() {
        let csv = "x,y,z\n1,2,3\n4,5,6\n7,8,9\n10,11,12\n";
        let table = parse_str(csv).unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn integer_column_stays_int64() {
        let table = parse_str("id\n1\n2\n3\n").unwrap();
        let id = table.column("id").unwrap();
        assert_eq!(id.dtype, DType::Int64);
        assert_eq!(id.values[2], Value::Integer(3));
    }

    #[test]
    fn null_markers_count_as_missing() {
        let table = parse_str("v,w\nNA,a\n1.5,\nnull,c\n2,N/A\n").unwrap();
        assert_eq!(table.column("v").unwrap().null_count(), 2);
        assert_eq!(table.column("v").unwrap().dtype, DType::Float64);
        assert_eq!(table.column("w").unwrap().null_count(), 2);
    }

    #[test]
    fn boolean_column_inferred() {
        let table = parse_str("flag\nTrue\nfalse\nTRUE\n").unwrap();
        let flag = table.column("flag").unwrap();
        assert_eq!(flag.dtype, DType::Bool);
        assert_eq!(flag.values[1], Value::Bool(false));
    }

    #[test]
    fn mixed_column_is_text() {
        let table = parse_str("m\n1\ntwo\n3\n").unwrap();
        assert_eq!(table.column("m").unwrap().dtype, DType::Object);
    }

    #[test]
    fn all_null_column_is_float() {
        let table = parse_str("a,b\n1,\n2,\n").unwrap();
        let b = table.column("b").unwrap();
        assert_eq!(b.dtype, DType::Float64);
        assert_eq!(b.null_count(), 2);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = parse_str("a,b,c\n1,2,3\n4\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("c").unwrap().null_count(), 1);
    }

    #[test]
    fn long_rows_are_rejected() {
        let err = parse_str("a,b\n1,2\n3,4,5\n").unwrap_err();
        match err {
            EdaError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let table = parse_str("a,a,,a\n1,2,3,4\n").unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn quoted_fields_with_commas() {
        let table = parse_str("name,score\n\"Smith, J\",3\n\"Doe, A\",4\n").unwrap();
        assert_eq!(
            table.column("name").unwrap().values[0],
            Value::Text("Smith, J".into())
        );
    }

    #[test]
    fn empty_input_is_parse_error() {
        assert!(matches!(parse_str(""), Err(EdaError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let path = std::env::temp_dir().join("rusty_eda_definitely_missing.csv");
        let err = load_csv(&path).unwrap_err();
        assert!(matches!(err, EdaError::FileAccess { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn load_from_disk() {
        let path = std::env::temp_dir().join("rusty_eda_loader_test.csv");
        std::fs::write(&path, "\u{feff}a,b\n1,x\n2,y\n").unwrap();
        let table = load_csv(&path).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.row_count(), 2);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_utf8_is_parse_error() {
        let path = std::env::temp_dir().join("rusty_eda_bad_utf8.csv");
        std::fs::write(&path, b"a\n1\n\xff\xfe\n").unwrap();
        let err = load_csv(&path).unwrap_err();
        match err {
            EdaError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
        std::fs::remove_file(&path).ok();
    }
}
