use image::{Rgba, RgbaImage};

use crate::data::model::Table;
use crate::error::{EdaError, Result};

/// Maximum image height; larger tables are bucketed.
pub const MAX_PIXEL_ROWS: usize = 1024;
/// Maximum image width, within the smallest texture side any egui backend
/// guarantees. Wider tables are bucketed by column.
pub const MAX_PIXEL_COLS: usize = 2048;

const PRESENT: Rgba<u8> = Rgba([64, 64, 64, 255]);
const ABSENT: Rgba<u8> = Rgba([245, 245, 245, 255]);

/// Null-location matrix: one pixel column per table column and one pixel
/// row per record (or per bucket of either). The viewer stretches it over
/// the plot, so all columns stay the same width on screen.
#[derive(Debug, Clone)]
pub struct MissingPatternFigure {
    pub columns: Vec<String>,
    pub rows: usize,
    pub missing_cells: usize,
    /// Fraction of missing values per column, in column order.
    pub missing_fraction: Vec<f64>,
    pub image: RgbaImage,
}

pub fn missing_pattern(table: &Table) -> Result<MissingPatternFigure> {
    let rows = table.row_count();
    let cols = table.column_count();
    if rows == 0 || cols == 0 {
        return Err(EdaError::InsufficientData {
            subject: "missing-pattern matrix".to_string(),
            required: 1,
            actual: 0,
        });
    }

    let pixel_rows = rows.min(MAX_PIXEL_ROWS);
    let pixel_cols = cols.min(MAX_PIXEL_COLS);
    let mut image = RgbaImage::from_pixel(pixel_cols as u32, pixel_rows as u32, PRESENT);

    let mut missing_cells = 0;
    let mut missing_fraction = Vec::with_capacity(cols);
    for (c, column) in table.columns().iter().enumerate() {
        let x = (c * pixel_cols / cols) as u32;
        let mut nulls = 0;
        for (row, value) in column.values.iter().enumerate() {
            if !value.is_null() {
                continue;
            }
            nulls += 1;
            // Any missing cell inside a bucket marks the whole bucket.
            let y = (row * pixel_rows / rows) as u32;
            image.put_pixel(x, y, ABSENT);
        }
        missing_cells += nulls;
        missing_fraction.push(nulls as f64 / rows as f64);
    }

    Ok(MissingPatternFigure {
        columns: table.column_names(),
        rows,
        missing_cells,
        missing_fraction,
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    impl MissingPatternFigure {
        fn is_missing_at(&self, col: usize, y: u32) -> bool {
            let x = col * self.image.width() as usize / self.columns.len();
            self.image.get_pixel(x as u32, y) == &ABSENT
        }
    }

    #[test]
    fn marks_missing_cells() {
        let table = parse_str("a,b\n1,x\n,y\n3,\n").unwrap();
        let fig = missing_pattern(&table).unwrap();
        assert_eq!(fig.missing_cells, 2);
        assert_eq!(fig.image.height(), 3);
        assert!(!fig.is_missing_at(0, 0));
        assert!(fig.is_missing_at(0, 1));
        assert!(fig.is_missing_at(1, 2));
        assert!(!fig.is_missing_at(1, 1));
        assert!((fig.missing_fraction[0] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn tall_tables_are_bucketed() {
        let mut csv = String::from("v\n");
        for i in 0..(MAX_PIXEL_ROWS * 3) {
            let cell = if i == 7 { "NA".to_string() } else { i.to_string() };
            csv.push_str(&cell);
            csv.push('\n');
        }
        let table = parse_str(&csv).unwrap();
        let fig = missing_pattern(&table).unwrap();
        assert_eq!(fig.image.height() as usize, MAX_PIXEL_ROWS);
        assert!(fig.is_missing_at(0, 2));
        assert_eq!(fig.missing_cells, 1);
    }

    #[test]
    fn wide_tables_are_bucketed_by_column() {
        let cols = MAX_PIXEL_COLS + 952;
        let header: Vec<String> = (0..cols).map(|c| format!("c{c}")).collect();
        let mut first: Vec<&str> = vec!["1"; cols];
        first[cols - 1] = "";
        let second = vec!["2"; cols];
        let csv = format!(
            "{}\n{}\n{}\n",
            header.join(","),
            first.join(","),
            second.join(",")
        );
        let table = parse_str(&csv).unwrap();
        let fig = missing_pattern(&table).unwrap();
        assert_eq!(fig.image.width() as usize, MAX_PIXEL_COLS);
        assert_eq!(fig.image.height(), 2);
        assert_eq!(fig.columns.len(), cols);
        assert!(fig.is_missing_at(cols - 1, 0));
        assert!(!fig.is_missing_at(0, 0));
        assert!(!fig.is_missing_at(cols - 1, 1));
        assert_eq!(fig.missing_cells, 1);
    }
}
