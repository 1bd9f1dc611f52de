//! Dashboard state: chart series, summary text and the threshold warning.

use std::time::Instant;

use super::metric::Metric;
use super::record::{format_number, format_tenths, SensorRecord};
use super::series::ChartSeries;

/// Text shown while any metric is above its threshold.
pub const WARNING_TEXT: &str = "Warning: Threshold exceeded!";

/// Thresholds above which the warning indicator is shown.
///
/// Comparisons are strict: a reading exactly at the threshold is fine.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Temperature in °C.
    pub temperature: f64,
    /// Air quality in ppm.
    pub air_quality: f64,
    /// Sound level in dB.
    pub sound_level: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: 30.0,
            air_quality: 300.0,
            sound_level: 80.0,
        }
    }
}

impl Thresholds {
    pub fn limit(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::AirQuality => self.air_quality,
            Metric::SoundLevel => self.sound_level,
        }
    }

    /// Metrics of `record` that are above their threshold.
    pub fn exceeded_by(&self, record: &SensorRecord) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|&m| record.value(m) > self.limit(m))
            .collect()
    }

    /// True when any metric of `record` is above its threshold.
    pub fn is_exceeded(&self, record: &SensorRecord) -> bool {
        Metric::ALL.iter().any(|&m| record.value(m) > self.limit(m))
    }
}

/// The three summary lines shown above the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub temperature: String,
    pub air_quality: String,
    pub sound_level: String,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            temperature: "Temperature: --".to_string(),
            air_quality: "Air Quality: --".to_string(),
            sound_level: "Sound Level: --".to_string(),
        }
    }
}

impl Summary {
    /// Format the summary lines for a record.
    pub fn from_record(record: &SensorRecord) -> Self {
        Self {
            temperature: format!("Temperature: {} °C", format_tenths(record.temperature)),
            air_quality: format!("Air Quality: {} ppm", format_number(record.air_quality)),
            sound_level: format!("Sound Level: {} dB", format_number(record.sound_level)),
        }
    }

    /// All three lines on one row, separated by ` | `.
    pub fn line(&self) -> String {
        format!(
            "{} | {} | {}",
            self.temperature, self.air_quality, self.sound_level
        )
    }

    pub fn get(&self, metric: Metric) -> &str {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::AirQuality => &self.air_quality,
            Metric::SoundLevel => &self.sound_level,
        }
    }
}

/// Everything the UI displays, updated one record at a time.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub temperature: ChartSeries,
    pub air_quality: ChartSeries,
    pub sound_level: ChartSeries,
    pub summary: Summary,
    /// Warning text while visible, `None` while hidden.
    pub warning: Option<&'static str>,
    /// Metrics that tripped the warning on the latest record.
    pub exceeded: Vec<Metric>,
    /// Records applied to the charts.
    pub applied: u64,
    /// Lines that could not be parsed.
    pub rejected: u64,
    /// Records that raised the warning.
    pub warnings: u64,
    pub last_updated: Option<Instant>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Dashboard {
    /// Create an empty dashboard. `history_limit` caps each series.
    pub fn new(history_limit: Option<usize>) -> Self {
        Self {
            temperature: ChartSeries::with_limit(history_limit),
            air_quality: ChartSeries::with_limit(history_limit),
            sound_level: ChartSeries::with_limit(history_limit),
            summary: Summary::default(),
            warning: None,
            exceeded: Vec::new(),
            applied: 0,
            rejected: 0,
            warnings: 0,
            last_updated: None,
        }
    }

    pub fn series(&self, metric: Metric) -> &ChartSeries {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::AirQuality => &self.air_quality,
            Metric::SoundLevel => &self.sound_level,
        }
    }

    fn series_mut(&mut self, metric: Metric) -> &mut ChartSeries {
        match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::AirQuality => &mut self.air_quality,
            Metric::SoundLevel => &mut self.sound_level,
        }
    }

    /// Apply a parsed record: append to every chart, refresh the summary
    /// and re-evaluate the warning.
    pub fn apply(&mut self, record: &SensorRecord, label: &str, thresholds: &Thresholds) {
        for metric in Metric::ALL {
            self.series_mut(metric).append(label, record.value(metric));
        }

        self.summary = Summary::from_record(record);

        self.exceeded = thresholds.exceeded_by(record);
        self.warning = if self.exceeded.is_empty() {
            None
        } else {
            self.warnings += 1;
            Some(WARNING_TEXT)
        };

        self.applied += 1;
        self.last_updated = Some(Instant::now());
    }

    /// Count a line that was dropped.
    pub fn reject(&mut self) {
        self.rejected += 1;
    }

    pub fn warning_visible(&self) -> bool {
        self.warning.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(temperature: f64, air_quality: f64, sound_level: f64) -> SensorRecord {
        SensorRecord::parse(&format!(
            r#"{{"temperature":{},"airQuality":{},"soundLevel":{}}}"#,
            temperature, air_quality, sound_level
        ))
        .unwrap()
    }

    #[test]
    fn test_warning_on_high_temperature() {
        let mut dashboard = Dashboard::default();
        dashboard.apply(&record(31.0, 100.0, 50.0), "12:00:00", &Thresholds::default());

        assert!(dashboard.warning_visible());
        assert_eq!(dashboard.warning, Some(WARNING_TEXT));
        assert_eq!(dashboard.exceeded, vec![Metric::Temperature]);
    }

    #[test]
    fn test_warning_hidden_below_thresholds() {
        let mut dashboard = Dashboard::default();
        dashboard.apply(&record(20.0, 100.0, 50.0), "12:00:00", &Thresholds::default());

        assert!(!dashboard.warning_visible());
        assert!(dashboard.exceeded.is_empty());
    }

    #[test]
    fn test_warning_clears_on_next_record() {
        let thresholds = Thresholds::default();
        let mut dashboard = Dashboard::default();

        dashboard.apply(&record(20.0, 301.0, 81.0), "12:00:00", &thresholds);
        assert_eq!(dashboard.exceeded, vec![Metric::AirQuality, Metric::SoundLevel]);

        dashboard.apply(&record(20.0, 100.0, 50.0), "12:00:01", &thresholds);
        assert!(!dashboard.warning_visible());
        assert_eq!(dashboard.warnings, 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut dashboard = Dashboard::default();
        dashboard.apply(&record(30.0, 300.0, 80.0), "12:00:00", &Thresholds::default());
        assert!(!dashboard.warning_visible());
    }

    #[test]
    fn test_summary_formatting() {
        let summary = Summary::from_record(&record(23.456, 120.0, 41.5));
        assert_eq!(summary.temperature, "Temperature: 23.5 °C");
        assert_eq!(summary.air_quality, "Air Quality: 120 ppm");
        assert_eq!(summary.sound_level, "Sound Level: 41.5 dB");
        assert_eq!(
            summary.line(),
            "Temperature: 23.5 °C | Air Quality: 120 ppm | Sound Level: 41.5 dB"
        );

        // Quarter-degree readings sit exactly on a tie and round up
        let summary = Summary::from_record(&record(22.25, 120.0, 41.5));
        assert_eq!(summary.temperature, "Temperature: 22.3 °C");
        let summary = Summary::from_record(&record(0.25, 120.0, 41.5));
        assert_eq!(summary.temperature, "Temperature: 0.3 °C");
    }

    #[test]
    fn test_apply_appends_to_all_series() {
        let mut dashboard = Dashboard::default();
        dashboard.apply(&record(21.0, 110.0, 40.0), "12:00:00", &Thresholds::default());
        dashboard.apply(&record(22.0, 120.0, 45.0), "12:00:01", &Thresholds::default());

        assert_eq!(dashboard.temperature.values().collect::<Vec<_>>(), vec![21.0, 22.0]);
        assert_eq!(dashboard.air_quality.values().collect::<Vec<_>>(), vec![110.0, 120.0]);
        assert_eq!(dashboard.sound_level.values().collect::<Vec<_>>(), vec![40.0, 45.0]);
        assert_eq!(dashboard.applied, 2);
        assert!(dashboard.last_updated.is_some());
    }

    #[test]
    fn test_history_limit_applies_to_every_series() {
        let mut dashboard = Dashboard::new(Some(1));
        dashboard.apply(&record(21.0, 110.0, 40.0), "a", &Thresholds::default());
        dashboard.apply(&record(22.0, 120.0, 45.0), "b", &Thresholds::default());

        for metric in Metric::ALL {
            assert_eq!(dashboard.series(metric).len(), 1);
            assert_eq!(dashboard.series(metric).first_label(), Some("b"));
        }
    }
}
