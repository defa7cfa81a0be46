//! Linear EDA run: load → profile → classify → figures → group test.
//!
//! The pipeline is pull-based: [`Pipeline::next_figure`] runs stages until
//! one produces a figure, so the caller decides when the next plot is
//! computed (after the current one has been acknowledged).

use std::fmt;
use std::path::Path;

use crate::capability::{self, Capabilities};
use crate::compare::{self, TestResult};
use crate::config::{ConfigIssue, EdaConfig};
use crate::data::classify::{classify, ColumnPartition};
use crate::data::loader;
use crate::data::model::Table;
use crate::error::{EdaError, Result};
use crate::profile::{self, Profile};
use crate::viz::{distribution, relationship, timeseries, Figure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Profile,
    Classify,
    Distributions,
    Correlation,
    Scatter,
    GroupedBoxplot,
    TimeSeries,
    GroupTest,
    MissingPattern,
    Complete,
}

impl Stage {
    fn next(self) -> Stage {
        match self {
            Stage::Load => Stage::Profile,
            Stage::Profile => Stage::Classify,
            Stage::Classify => Stage::Distributions,
            Stage::Distributions => Stage::Correlation,
            Stage::Correlation => Stage::Scatter,
            Stage::Scatter => Stage::GroupedBoxplot,
            Stage::GroupedBoxplot => Stage::TimeSeries,
            Stage::TimeSeries => Stage::GroupTest,
            Stage::GroupTest => Stage::MissingPattern,
            Stage::MissingPattern | Stage::Complete => Stage::Complete,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Profile => "profile",
            Stage::Classify => "classify",
            Stage::Distributions => "distributions",
            Stage::Correlation => "correlation",
            Stage::Scatter => "scatter",
            Stage::GroupedBoxplot => "grouped boxplot",
            Stage::TimeSeries => "time series",
            Stage::GroupTest => "group test",
            Stage::MissingPattern => "missing pattern",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// A group comparison that ran, with the labels it used.
#[derive(Debug, Clone)]
pub struct GroupComparison {
    pub category: String,
    pub value: String,
    pub groups: [String; 2],
    pub result: TestResult,
}

pub struct Pipeline {
    config: EdaConfig,
    table: Table,
    capabilities: Capabilities,
    stage: Stage,
    partition: ColumnPartition,
    profile: Option<Profile>,
    next_distribution: usize,
    comparison: Option<GroupComparison>,
    pending_issues: Vec<ConfigIssue>,
    failures: Vec<(Stage, String)>,
    figures_emitted: usize,
}

impl Pipeline {
    /// Load the dataset. Any failure here is fatal to the run.
    pub fn load(config: EdaConfig, path: &Path) -> Result<Self> {
        log::debug!("[{}] {}", Stage::Load, path.display());
        let table = loader::load_csv(path)?;
        Ok(Self::from_table(config, table))
    }

    /// Start a run over an already loaded table.
    pub fn from_table(config: EdaConfig, table: Table) -> Self {
        let pending_issues = config.validate(&table);
        for issue in &pending_issues {
            log::warn!("[{}] {}; stage will be skipped", issue.stage, issue.error);
        }
        Self {
            config,
            table,
            capabilities: capability::get(),
            stage: Stage::Profile,
            partition: ColumnPartition::default(),
            profile: None,
            next_distribution: 0,
            comparison: None,
            pending_issues,
            failures: Vec::new(),
            figures_emitted: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn partition(&self) -> &ColumnPartition {
        &self.partition
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn comparison(&self) -> Option<&GroupComparison> {
        self.comparison.as_ref()
    }

    /// Stages that failed, with their messages.
    pub fn failures(&self) -> &[(Stage, String)] {
        &self.failures
    }

    pub fn figures_emitted(&self) -> usize {
        self.figures_emitted
    }

    /// Run stages until one yields a figure; `None` once the run is complete.
    pub fn next_figure(&mut self) -> Option<Figure> {
        while self.stage != Stage::Complete {
            let stage = self.stage;
            match self.step() {
                Ok(Some(figure)) => {
                    self.figures_emitted += 1;
                    return Some(figure);
                }
                Ok(None) => {}
                Err(EdaError::OptionalDependencyMissing { capability }) => {
                    println!(
                        "{capability} capability not available; skipping missing data visualization."
                    );
                    log::warn!("[{stage}] skipped: {capability} not available");
                }
                Err(e) => {
                    log::error!("[{stage}] {e}");
                    self.failures.push((stage, e.to_string()));
                }
            }
            if self.stage == Stage::Complete {
                log::info!(
                    "EDA complete: {} figure(s), {} failed step(s)",
                    self.figures_emitted,
                    self.failures.len()
                );
            }
        }
        None
    }

    /// Drain the run without a display, logging each figure.
    pub fn run_headless(&mut self) {
        while let Some(figure) = self.next_figure() {
            log::info!("{}: {}", figure.title(), figure.summary());
        }
    }

    /// Run the current stage once and move the cursor on.
    fn step(&mut self) -> Result<Option<Figure>> {
        let stage = self.stage;
        log::debug!("entering stage {stage}");

        // Distributions stays put until every numerical column is drawn.
        if stage == Stage::Distributions {
            return self.step_distribution();
        }
        self.stage = stage.next();

        if let Some(idx) = self.pending_issues.iter().position(|i| i.stage == stage) {
            // Drop the rest of this stage's issues; one message is enough.
            let issue = self.pending_issues.remove(idx);
            self.pending_issues.retain(|i| i.stage != stage);
            return Err(issue.error);
        }

        match stage {
            Stage::Load | Stage::Distributions | Stage::Complete => Ok(None),
            Stage::Profile => {
                let profile = profile::profile(&self.table, self.config.head_rows);
                let printed = profile.print();
                self.profile = Some(profile);
                printed.map(|_| None)
            }
            Stage::Classify => {
                self.partition = classify(&self.table);
                self.partition.print();
                Ok(None)
            }
            Stage::Correlation => self.step_correlation(),
            Stage::Scatter => match &self.config.scatter {
                Some(s) => relationship::scatter(&self.table, &s.x, &s.y, s.hue.as_deref())
                    .map(|f| Some(Figure::Scatter(f))),
                None => Ok(None),
            },
            Stage::GroupedBoxplot => match &self.config.grouped_boxplot {
                Some(b) => relationship::grouped_boxplot(&self.table, &b.category, &b.value)
                    .map(|f| Some(Figure::GroupedBoxplot(f))),
                None => Ok(None),
            },
            Stage::TimeSeries => match &self.config.time_series {
                Some(t) => timeseries::time_series(&self.table, &t.date, &t.value)
                    .map(|f| Some(Figure::TimeSeries(f))),
                None => Ok(None),
            },
            Stage::GroupTest => self.step_group_test().map(|_| None),
            Stage::MissingPattern => {
                if !self.config.missing_pattern {
                    return Ok(None);
                }
                if !self.capabilities.missing_matrix {
                    return Err(EdaError::OptionalDependencyMissing {
                        capability: "missing-pattern",
                    });
                }
                self.missing_pattern_figure().map(Some)
            }
        }
    }

    fn step_distribution(&mut self) -> Result<Option<Figure>> {
        let Some(column) = self
            .partition
            .numerical
            .get(self.next_distribution)
            .filter(|_| self.config.distributions)
            .cloned()
        else {
            self.stage = Stage::Distributions.next();
            return Ok(None);
        };
        self.next_distribution += 1;
        distribution::distribution(&self.table, &column).map(|f| Some(Figure::Distribution(f)))
    }

    fn step_correlation(&mut self) -> Result<Option<Figure>> {
        if !self.config.correlation {
            return Ok(None);
        }
        if self.partition.numerical.is_empty() {
            log::info!("no numerical columns; skipping correlation heatmap");
            return Ok(None);
        }
        let figure = relationship::correlation_matrix(&self.table, &self.partition.numerical)?;
        println!("\n----- Correlation Matrix -----");
        println!("{}", figure.render_text());
        Ok(Some(Figure::Correlation(figure)))
    }

    /// Resolve the comparison inputs (picking the first categorical column,
    /// first numerical column and first two levels where unset) and run it.
    fn step_group_test(&mut self) -> Result<()> {
        let Some(cfg) = self.config.group_test.clone() else {
            return Ok(());
        };

        let category = match cfg.category {
            Some(c) => c,
            None => match self.partition.categorical.first() {
                Some(c) => {
                    log::warn!("group test: no category configured, using first categorical column '{c}'");
                    c.clone()
                }
                None => {
                    log::info!("no categorical column; skipping group test");
                    return Ok(());
                }
            },
        };
        let value = match cfg.value {
            Some(v) => v,
            None => match self.partition.numerical.first() {
                Some(v) => {
                    log::warn!("group test: no value configured, using first numerical column '{v}'");
                    v.clone()
                }
                None => {
                    log::info!("no numerical column; skipping group test");
                    return Ok(());
                }
            },
        };
        let groups = match cfg.groups {
            Some(g) => g,
            None => {
                let levels = self.table.column(&category)?.levels();
                if levels.len() < 2 {
                    log::info!("'{category}' has fewer than two levels; skipping group test");
                    return Ok(());
                }
                let picked = [levels[0].to_string(), levels[1].to_string()];
                log::warn!(
                    "group test: no groups configured, using first two levels '{}' and '{}'",
                    picked[0],
                    picked[1]
                );
                picked
            }
        };

        let result = compare::compare_groups(&self.table, &category, &value, &groups[0], &groups[1])?;
        self.comparison = Some(GroupComparison {
            category,
            value,
            groups,
            result,
        });
        Ok(())
    }

    #[cfg(feature = "missing-matrix")]
    fn missing_pattern_figure(&self) -> Result<Figure> {
        crate::viz::missing::missing_pattern(&self.table).map(Figure::MissingPattern)
    }

    #[cfg(not(feature = "missing-matrix"))]
    fn missing_pattern_figure(&self) -> Result<Figure> {
        Err(EdaError::OptionalDependencyMissing {
            capability: "missing-pattern",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayMode, GroupTestConfig, ScatterConfig, TimeSeriesConfig};
    use crate::data::loader::parse_str;

    const CSV: &str = "day,region,units,price\n\
        2024-01-03,north,10,2.5\n\
        2024-01-01,south,14,2.0\n\
        2024-01-02,north,11,2.4\n\
        2024-01-04,south,15,\n\
        2024-01-05,north,9,2.7\n\
        2024-01-06,south,16,1.9\n";

    fn headless() -> EdaConfig {
        EdaConfig {
            display: DisplayMode::Headless,
            ..EdaConfig::default()
        }
    }

    fn drain(pipeline: &mut Pipeline) -> Vec<String> {
        std::iter::from_fn(|| pipeline.next_figure())
            .map(|f| f.title())
            .collect()
    }

    #[test]
    fn default_run_visits_stages_in_order() {
        let table = parse_str(CSV).unwrap();
        let cfg = EdaConfig {
            group_test: None,
            ..headless()
        };
        let mut p = Pipeline::from_table(cfg, table);
        let titles = drain(&mut p);

        assert_eq!(titles[0], "Histogram and boxplot of units");
        assert_eq!(titles[1], "Histogram and boxplot of price");
        assert_eq!(titles[2], "Correlation Heatmap");
        if cfg!(feature = "missing-matrix") {
            assert_eq!(titles.last().unwrap(), "Missing Data Pattern");
            assert_eq!(titles.len(), 4);
        } else {
            assert_eq!(titles.len(), 3);
        }
        assert_eq!(p.stage(), Stage::Complete);
        assert!(p.failures().is_empty());
        assert_eq!(p.partition().categorical, vec!["day", "region"]);
        assert!(p.profile().is_some());
    }

    #[test]
    fn missing_capability_skips_matrix_without_failing() {
        let table = parse_str(CSV).unwrap();
        let cfg = EdaConfig {
            group_test: None,
            ..headless()
        };
        let mut p = Pipeline::from_table(cfg, table);
        p.capabilities.missing_matrix = false;
        let titles = drain(&mut p);

        assert_eq!(titles.len(), 3);
        assert!(!titles.iter().any(|t| t == "Missing Data Pattern"));
        assert!(p.failures().is_empty());
        assert_eq!(p.stage(), Stage::Complete);
    }

    #[test]
    fn group_test_is_picked_automatically() {
        let table = parse_str(CSV).unwrap();
        let mut p = Pipeline::from_table(headless(), table);
        p.run_headless();
        // First categorical column is `day`: every level is unique, so each
        // group has one observation and the test fails cleanly.
        assert!(p.comparison().is_none());
        assert_eq!(p.failures().len(), 1);
        assert_eq!(p.failures()[0].0, Stage::GroupTest);
        assert!(p.failures()[0].1.contains("at least 2"));
    }

    #[test]
    fn explicit_group_test_runs() {
        let table = parse_str(CSV).unwrap();
        let cfg = EdaConfig {
            group_test: Some(GroupTestConfig {
                category: Some("region".into()),
                value: None,
                groups: None,
            }),
            missing_pattern: false,
            ..headless()
        };
        let mut p = Pipeline::from_table(cfg, table);
        p.run_headless();
        let cmp = p.comparison().unwrap();
        assert_eq!(cmp.value, "units");
        assert_eq!(cmp.groups, ["north".to_string(), "south".to_string()]);
        assert!(cmp.result.statistic < 0.0);
        assert!((0.0..=1.0).contains(&cmp.result.p_value));
    }

    #[test]
    fn bad_column_fails_only_its_stage() {
        let table = parse_str(CSV).unwrap();
        let cfg = EdaConfig {
            scatter: Some(ScatterConfig {
                x: "units".into(),
                y: "no_such_column".into(),
                hue: None,
            }),
            time_series: Some(TimeSeriesConfig {
                date: "day".into(),
                value: "units".into(),
            }),
            group_test: None,
            missing_pattern: false,
            ..headless()
        };
        let mut p = Pipeline::from_table(cfg, table);
        let titles = drain(&mut p);

        assert_eq!(p.failures().len(), 1);
        assert_eq!(p.failures()[0].0, Stage::Scatter);
        assert!(p.failures()[0].1.contains("no_such_column"));
        assert_eq!(titles.last().unwrap(), "Time Series of units");
    }

    #[test]
    fn empty_numerical_set_yields_no_distribution_figures() {
        let table = parse_str("a,b\nx,y\nz,w\n").unwrap();
        let cfg = EdaConfig {
            missing_pattern: false,
            ..headless()
        };
        let mut p = Pipeline::from_table(cfg, table);
        assert!(p.next_figure().is_none());
        assert!(p.failures().is_empty());
        assert_eq!(p.stage(), Stage::Complete);
    }

    #[test]
    fn load_failure_is_fatal() {
        let path = std::env::temp_dir().join("rusty_eda_pipeline_missing.csv");
        let err = Pipeline::load(headless(), &path).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn stage_names_identify_steps() {
        assert_eq!(Stage::GroupedBoxplot.to_string(), "grouped boxplot");
        assert_eq!(Stage::MissingPattern.next(), Stage::Complete);
        assert_eq!(Stage::Complete.next(), Stage::Complete);
    }
}
