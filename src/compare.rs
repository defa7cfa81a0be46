//! Two-group mean comparison (Student's independent two-sample t-test).

use crate::data::model::Table;
use crate::error::{EdaError, Result};
use crate::stats;

/// Outcome of one t-test invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub df: f64,
    pub n1: usize,
    pub n2: usize,
    pub mean1: f64,
    pub mean2: f64,
}

/// Pooled-variance t-test on two samples.
///
/// Fails with `InsufficientData` when either group has fewer than two
/// observations and with `ZeroVariance` when both groups are constant, so
/// a NaN statistic never reaches the caller.
pub fn t_test(group1: &[f64], group2: &[f64], label1: &str, label2: &str) -> Result<TestResult> {
    for (label, group) in [(label1, group1), (label2, group2)] {
        if group.len() < 2 {
            return Err(EdaError::InsufficientData {
                subject: format!("group '{label}'"),
                required: 2,
                actual: group.len(),
            });
        }
    }

    let (n1, n2) = (group1.len() as f64, group2.len() as f64);
    let (mean1, mean2) = (stats::mean(group1), stats::mean(group2));
    let df = n1 + n2 - 2.0;
    let pooled =
        ((n1 - 1.0) * stats::variance(group1) + (n2 - 1.0) * stats::variance(group2)) / df;

    if pooled <= 0.0 {
        return Err(EdaError::ZeroVariance {
            subject: format!("groups '{label1}' and '{label2}'"),
        });
    }

    let statistic = (mean1 - mean2) / (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    let p_value = stats::student_t_two_sided_p(statistic, df)?;

    Ok(TestResult {
        statistic,
        p_value,
        df,
        n1: group1.len(),
        n2: group2.len(),
        mean1,
        mean2,
    })
}

/// Values of `value_col` in rows where `category_col` displays as `label`.
fn select_group(table: &Table, category_col: &str, value_col: &str, label: &str) -> Result<Vec<f64>> {
    let category = table.column(category_col)?;
    let values = table.numeric_column(value_col)?;
    Ok(category
        .values
        .iter()
        .zip(&values.values)
        .filter(|(c, _)| !c.is_null() && c.to_string() == label)
        .filter_map(|(_, v)| v.as_f64())
        .collect())
}

/// Compare `value_col` between two levels of `category_col` and print the
/// result.
pub fn compare_groups(
    table: &Table,
    category_col: &str,
    value_col: &str,
    group1: &str,
    group2: &str,
) -> Result<TestResult> {
    let a = select_group(table, category_col, value_col, group1)?;
    let b = select_group(table, category_col, value_col, group2)?;
    log::debug!(
        "t-test on '{value_col}': {} values for '{group1}', {} for '{group2}'",
        a.len(),
        b.len()
    );

    let result = t_test(&a, &b, group1, group2)?;
    println!("\nT-test comparing {value_col} between {group1} and {group2}:");
    println!(
        "t-statistic = {:.4}, p-value = {:.4}",
        result.statistic, result.p_value
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    #[test]
    fn known_result_for_small_groups() {
        let r = t_test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], "a", "b").unwrap();
        assert!(r.statistic < 0.0);
        assert!((r.statistic - (-3.674_234_614_174_767)).abs() < 1e-9);
        assert!((r.p_value - 0.021_311_641_128_756_5).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&r.p_value));
        assert_eq!(r.df, 4.0);
    }

    #[test]
    fn swapping_groups_negates_statistic() {
        let a = [2.1, 3.4, 1.9, 5.6, 4.4];
        let b = [6.0, 5.2, 7.7, 4.9];
        let ab = t_test(&a, &b, "a", "b").unwrap();
        let ba = t_test(&b, &a, "b", "a").unwrap();
        assert!((ab.statistic + ba.statistic).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }

    #[test]
    fn tiny_group_is_insufficient() {
        let err = t_test(&[1.0], &[2.0, 3.0], "a", "b").unwrap_err();
        assert!(matches!(
            err,
            EdaError::InsufficientData { required: 2, actual: 1, .. }
        ));
        assert!(t_test(&[], &[2.0, 3.0], "a", "b").is_err());
    }

    #[test]
    fn constant_groups_are_zero_variance() {
        let err = t_test(&[1.0, 1.0], &[1.0, 1.0], "a", "b").unwrap_err();
        assert!(matches!(err, EdaError::ZeroVariance { .. }));
    }

    #[test]
    fn compare_groups_selects_rows_and_drops_missing() {
        let csv = "g,v\nx,1\ny,4\nx,2\ny,5\nx,3\ny,6\nx,\nz,100\n";
        let table = parse_str(csv).unwrap();
        let r = compare_groups(&table, "g", "v", "x", "y").unwrap();
        assert_eq!((r.n1, r.n2), (3, 3));
        assert!((r.statistic - (-3.674_234_614_174_767)).abs() < 1e-9);
    }

    #[test]
    fn compare_groups_unknown_column() {
        let table = parse_str("g,v\nx,1\n").unwrap();
        assert!(matches!(
            compare_groups(&table, "nope", "v", "x", "y"),
            Err(EdaError::ColumnNotFound { .. })
        ));
    }
}
