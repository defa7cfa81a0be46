//! Typed run configuration, read from JSON.
//!
//! ```json
//! {
//!   "dataset": "sales.csv",
//!   "scatter": { "x": "price", "y": "units", "hue": "region" },
//!   "grouped_boxplot": { "category": "region", "value": "units" },
//!   "time_series": { "date": "day", "value": "units" },
//!   "group_test": { "category": "region", "value": "units", "groups": ["north", "south"] }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::model::Table;
use crate::error::{EdaError, Result};
use crate::pipeline::Stage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Show each figure in a window, one at a time.
    #[default]
    Window,
    /// Only log figure summaries.
    Headless,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScatterConfig {
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub hue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupedBoxplotConfig {
    pub category: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSeriesConfig {
    pub date: String,
    pub value: String,
}

/// Group comparison inputs; every field left out is picked automatically.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupTestConfig {
    pub category: Option<String>,
    pub value: Option<String>,
    pub groups: Option<[String; 2]>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdaConfig {
    pub dataset: Option<PathBuf>,
    pub display: DisplayMode,
    pub head_rows: usize,
    pub distributions: bool,
    pub correlation: bool,
    pub scatter: Option<ScatterConfig>,
    pub grouped_boxplot: Option<GroupedBoxplotConfig>,
    pub time_series: Option<TimeSeriesConfig>,
    /// `null` disables the test.
    pub group_test: Option<GroupTestConfig>,
    pub missing_pattern: bool,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            display: DisplayMode::Window,
            head_rows: 5,
            distributions: true,
            correlation: true,
            scatter: None,
            grouped_boxplot: None,
            time_series: None,
            group_test: Some(GroupTestConfig::default()),
            missing_pattern: true,
        }
    }
}

/// A configured column that does not fit the loaded table.
#[derive(Debug)]
pub struct ConfigIssue {
    pub stage: Stage,
    pub error: EdaError,
}

impl EdaConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EdaError::Config(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EdaError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
            .inspect_err(|_| log::error!("bad configuration file {}", path.display()))
    }

    /// Resolve the command-line argument: a `.json` path is a config file,
    /// anything else is the dataset itself.
    pub fn from_arg(arg: Option<&str>) -> Result<Self> {
        match arg {
            Some(a) if a.to_ascii_lowercase().ends_with(".json") => Self::from_path(Path::new(a)),
            Some(a) => Ok(Self {
                dataset: Some(PathBuf::from(a)),
                ..Self::default()
            }),
            None => {
                let default_path = Path::new("eda.json");
                if default_path.exists() {
                    Self::from_path(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Check every named column against the table schema.
    pub fn validate(&self, table: &Table) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut check = |stage: Stage, name: &str, numeric: bool| {
            let result = if numeric {
                table.numeric_column(name).map(|_| ())
            } else {
                table.column(name).map(|_| ())
            };
            if let Err(error) = result {
                issues.push(ConfigIssue { stage, error });
            }
        };

        if let Some(s) = &self.scatter {
            check(Stage::Scatter, &s.x, true);
            check(Stage::Scatter, &s.y, true);
            if let Some(hue) = &s.hue {
                check(Stage::Scatter, hue, false);
            }
        }
        if let Some(b) = &self.grouped_boxplot {
            check(Stage::GroupedBoxplot, &b.category, false);
            check(Stage::GroupedBoxplot, &b.value, true);
        }
        if let Some(t) = &self.time_series {
            check(Stage::TimeSeries, &t.date, false);
            check(Stage::TimeSeries, &t.value, true);
        }
        if let Some(g) = &self.group_test {
            if let Some(category) = &g.category {
                check(Stage::GroupTest, category, false);
            }
            if let Some(value) = &g.value {
                check(Stage::GroupTest, value, true);
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = EdaConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, EdaConfig::default());
        assert_eq!(cfg.head_rows, 5);
        assert_eq!(cfg.group_test, Some(GroupTestConfig::default()));
    }

    #[test]
    fn null_disables_group_test() {
        let cfg = EdaConfig::from_json_str(r#"{"group_test": null}"#).unwrap();
        assert_eq!(cfg.group_test, None);
    }

    #[test]
    fn full_config_parses() {
        let cfg = EdaConfig::from_json_str(
            r#"{
                "dataset": "data.csv",
                "display": "headless",
                "scatter": {"x": "a", "y": "b", "hue": "c"},
                "time_series": {"date": "d", "value": "a"},
                "group_test": {"category": "c", "groups": ["x", "y"]}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.display, DisplayMode::Headless);
        assert_eq!(cfg.scatter.unwrap().hue.as_deref(), Some("c"));
        let g = cfg.group_test.unwrap();
        assert_eq!(g.groups, Some(["x".to_string(), "y".to_string()]));
        assert_eq!(g.value, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = EdaConfig::from_json_str(r#"{"numerical_column": "x"}"#).unwrap_err();
        assert!(matches!(err, EdaError::Config(_)));
    }

    #[test]
    fn dataset_argument_uses_defaults() {
        let cfg = EdaConfig::from_arg(Some("data/sales.csv")).unwrap();
        assert_eq!(cfg.dataset, Some(PathBuf::from("data/sales.csv")));
        assert_eq!(cfg.display, DisplayMode::Window);
    }

    #[test]
    fn validate_reports_each_bad_column() {
        let table = parse_str("a,b,c\n1,2,x\n").unwrap();
        let cfg = EdaConfig {
            scatter: Some(ScatterConfig {
                x: "a".into(),
                y: "missing_y".into(),
                hue: Some("c".into()),
            }),
            grouped_boxplot: Some(GroupedBoxplotConfig {
                category: "c".into(),
                value: "c".into(),
            }),
            ..EdaConfig::default()
        };
        let issues = cfg.validate(&table);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].stage, Stage::Scatter);
        assert!(matches!(issues[0].error, EdaError::ColumnNotFound { .. }));
        assert_eq!(issues[1].stage, Stage::GroupedBoxplot);
        assert!(matches!(issues[1].error, EdaError::WrongColumnType { .. }));
    }
}
