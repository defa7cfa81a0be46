use super::model::{DType, Table};

/// Column names split by declared storage type.
///
/// `Bool` columns land in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPartition {
    pub categorical: Vec<String>,
    pub numerical: Vec<String>,
}

/// Partition the table's columns into categorical (text) and numerical
/// (integer/real) names, in table order.
pub fn classify(table: &Table) -> ColumnPartition {
    let mut partition = ColumnPartition::default();
    for col in table.columns() {
        match col.dtype {
            DType::Object => partition.categorical.push(col.name.clone()),
            DType::Int64 | DType::Float64 => partition.numerical.push(col.name.clone()),
            DType::Bool => {}
        }
    }
    partition
}

impl ColumnPartition {
    /// Print both groups the way the report shows them.
    pub fn print(&self) {
        println!("\nCategorical variables: {:?}", self.categorical);
        println!("Numerical variables: {:?}", self.numerical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    #[test]
    fn partition_follows_column_order() {
        let table = parse_str("c1,n1,c2,n2\na,1,x,1.5\nb,2,y,2.5\n").unwrap();
        let p = classify(&table);
        assert_eq!(p.categorical, vec!["c1", "c2"]);
        assert_eq!(p.numerical, vec!["n1", "n2"]);
    }

    #[test]
    fn partition_is_disjoint_subset() {
        let table = parse_str("a,b,flag,d\n1,x,True,2020-01-01\n,y,False,2020-01-02\n").unwrap();
        let p = classify(&table);
        let names = table.column_names();
        for n in &p.categorical {
            assert!(names.contains(n));
            assert!(!p.numerical.contains(n));
        }
        for n in &p.numerical {
            assert!(names.contains(n));
        }
        // Booleans fall into neither group; unparsed dates are text.
        assert!(!p.categorical.contains(&"flag".to_string()));
        assert!(!p.numerical.contains(&"flag".to_string()));
        assert!(p.categorical.contains(&"d".to_string()));
    }

    #[test]
    fn empty_table_has_empty_partition() {
        let table = Table::default();
        assert_eq!(classify(&table), ColumnPartition::default());
    }
}
