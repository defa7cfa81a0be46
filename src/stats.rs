//! Descriptive and inferential statistics used by the profiler and the
//! visualizers.
//!
//! All functions take plain `f64` slices with missing values already
//! removed, unless the signature says otherwise (`Option<f64>` pairs for
//! pairwise-complete correlation).

use std::f64::consts::PI;

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Moments and quantiles
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Sample variance (ddof = 1). `NaN` for fewer than two values.
pub fn variance(values: &[f64]) -> f64 {
    values.iter().variance()
}

pub fn std_dev(values: &[f64]) -> f64 {
    values.iter().std_dev()
}

/// Linear-interpolation quantile of an already sorted slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// count / mean / std / min / quartiles / max of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    pub fn of(values: &[f64]) -> Self {
        let s = sorted(values);
        Self {
            count: s.len(),
            mean: mean(&s),
            std: std_dev(&s),
            min: s.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&s, 0.25),
            q50: quantile_sorted(&s, 0.5),
            q75: quantile_sorted(&s, 0.75),
            max: s.last().copied().unwrap_or(f64::NAN),
        }
    }

    /// Rows in display order, labelled the way summary tables label them.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => {
                (hi - lo) / self.counts.len() as f64
            }
            _ => 1.0,
        }
    }
}

/// Upper bound on the number of histogram bins.
pub const MAX_BINS: usize = 10_000;

/// Histogram with "auto" binning: the smaller of the Sturges and
/// Freedman–Diaconis widths (Sturges alone when the IQR is zero, or when
/// the Freedman–Diaconis width would need more than [`MAX_BINS`] bins).
pub fn histogram(values: &[f64]) -> Option<Histogram> {
    if values.is_empty() {
        return None;
    }
    let s = sorted(values);
    let (min, max) = (s[0], s[s.len() - 1]);
    let n = s.len() as f64;
    let range = max - min;

    if range <= 0.0 {
        return Some(Histogram {
            edges: vec![min - 0.5, min + 0.5],
            counts: vec![s.len()],
        });
    }

    let sturges = range / (n.log2() + 1.0);
    let iqr = quantile_sorted(&s, 0.75) - quantile_sorted(&s, 0.25);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
    let bins_for = |width: f64| (range / width).ceil().max(1.0);
    let n_bins = if fd > 0.0 && bins_for(fd) <= MAX_BINS as f64 {
        bins_for(fd.min(sturges))
    } else {
        bins_for(sturges)
    };
    let n_bins = n_bins.min(MAX_BINS as f64) as usize;

    let step = range / n_bins as f64;
    let edges: Vec<f64> = (0..=n_bins).map(|i| min + step * i as f64).collect();
    let mut counts = vec![0usize; n_bins];
    for v in &s {
        // Last bin is closed on the right.
        let idx = (((v - min) / step) as usize).min(n_bins - 1);
        counts[idx] += 1;
    }
    Some(Histogram { edges, counts })
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

pub const KDE_GRID_SIZE: usize = 200;

/// Gaussian KDE with Scott's bandwidth, evaluated on `grid_size` points
/// spanning `[min, max]`. Returns `(x, density)` pairs.
pub fn kde(values: &[f64], grid_size: usize) -> Option<Vec<[f64; 2]>> {
    let n = values.len();
    let sd = std_dev(values);
    if n < 2 || !sd.is_finite() || sd <= 0.0 || grid_size < 2 {
        return None;
    }
    let bw = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bw * (2.0 * PI).sqrt());
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / (grid_size - 1) as f64;

    let curve = (0..grid_size)
        .map(|i| {
            let x = min + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / bw).powi(2)).exp())
                .sum();
            [x, density * norm]
        })
        .collect();
    Some(curve)
}

// ---------------------------------------------------------------------------
// Box-plot statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub fliers: Vec<f64>,
}

/// Quartiles plus whiskers at the most extreme points within 1.5·IQR.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let s = sorted(values);
    let q1 = quantile_sorted(&s, 0.25);
    let median = quantile_sorted(&s, 0.5);
    let q3 = quantile_sorted(&s, 0.75);
    let iqr = q3 - q1;
    let lo_limit = q1 - 1.5 * iqr;
    let hi_limit = q3 + 1.5 * iqr;

    let lower_whisker = s.iter().copied().find(|&v| v >= lo_limit).unwrap_or(q1);
    let upper_whisker = s.iter().rev().copied().find(|&v| v <= hi_limit).unwrap_or(q3);
    let fliers = s
        .iter()
        .copied()
        .filter(|&v| v < lower_whisker || v > upper_whisker)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        fliers,
    })
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over rows where both sides are present.
///
/// `NaN` when fewer than two complete rows remain or either side is constant.
pub fn pearson_pairwise(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let (a, b): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    if a.len() < 2 {
        return f64::NAN;
    }
    let denom = std_dev(&a) * std_dev(&b);
    if denom == 0.0 || !denom.is_finite() {
        return f64::NAN;
    }
    (a.iter().covariance(b.iter()) / denom).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Student t distribution
// ---------------------------------------------------------------------------

/// Two-sided p-value `P(|T| >= |t|)` for Student's t with `df` degrees of
/// freedom.
pub fn student_t_two_sided_p(t: f64, df: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df)?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}
