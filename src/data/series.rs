//! Time series backing each chart.

use std::collections::VecDeque;

/// An ordered series of `(label, value)` points for one metric.
///
/// Labels and values are stored side by side and always have the same
/// length. The series grows without bound unless a limit is set, in which
/// case the oldest points are evicted first.
#[derive(Debug, Clone, Default)]
pub struct ChartSeries {
    labels: VecDeque<String>,
    values: VecDeque<f64>,
    limit: Option<usize>,
    /// Number of points evicted so far; keeps x positions monotonic.
    evicted: usize,
}

impl ChartSeries {
    /// Create an unbounded series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a series that keeps at most `limit` points.
    ///
    /// A limit of zero is treated as "no limit".
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.filter(|&n| n > 0),
            ..Self::default()
        }
    }

    /// Append one point.
    pub fn append(&mut self, label: impl Into<String>, value: f64) {
        self.labels.push_back(label.into());
        self.values.push_back(value);

        if let Some(limit) = self.limit {
            while self.values.len() > limit {
                self.labels.pop_front();
                self.values.pop_front();
                self.evicted += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Most recent value, if any.
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn first_label(&self) -> Option<&str> {
        self.labels.front().map(String::as_str)
    }

    pub fn last_label(&self) -> Option<&str> {
        self.labels.back().map(String::as_str)
    }

    /// Points for plotting: x is the sample number since the series started.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| ((self.evicted + i) as f64, v))
            .collect()
    }

    /// X axis range covering all retained points.
    pub fn x_bounds(&self) -> [f64; 2] {
        let start = self.evicted as f64;
        let end = (self.evicted + self.values.len().saturating_sub(1)) as f64;
        [start, end.max(start + 1.0)]
    }

    /// Y axis range with a little headroom above and below the data.
    pub fn y_bounds(&self) -> [f64; 2] {
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }

        let pad = if max > min { (max - min) * 0.1 } else { 1.0 };
        [min - pad, max + pad]
    }
}
