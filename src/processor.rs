//! Per-line record processing.
//!
//! Turns one device line into dashboard updates and a backend forward.
//! Lines are processed one at a time; all local updates for a line are
//! applied before the call returns, and the forward runs detached.

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::data::{Dashboard, Metric, SensorRecord, Thresholds};
use crate::error::RecordError;
use crate::forward::Forwarder;

/// Applies device lines to a [`Dashboard`] and forwards them.
#[derive(Debug, Clone)]
pub struct RecordProcessor {
    thresholds: Thresholds,
    forwarder: Option<Forwarder>,
}

impl RecordProcessor {
    /// Create a processor. Without a forwarder records are only displayed.
    pub fn new(thresholds: Thresholds, forwarder: Option<Forwarder>) -> Self {
        Self {
            thresholds,
            forwarder,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn forwarder(&self) -> Option<&Forwarder> {
        self.forwarder.as_ref()
    }

    /// Process one trimmed, non-empty line, labelled with the current time.
    pub fn process_line(
        &self,
        dashboard: &mut Dashboard,
        line: &str,
    ) -> Result<SensorRecord, RecordError> {
        self.process_line_at(dashboard, line, Local::now())
    }

    /// Process one line as if it arrived at `now`.
    ///
    /// On a parse failure the line is logged and counted as rejected; the
    /// dashboard is otherwise untouched and nothing is forwarded.
    pub fn process_line_at(
        &self,
        dashboard: &mut Dashboard,
        line: &str,
        now: DateTime<Local>,
    ) -> Result<SensorRecord, RecordError> {
        let record = match SensorRecord::parse(line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Dropping unparseable line {:?}: {}", line, e);
                dashboard.reject();
                return Err(e);
            }
        };

        dashboard.apply(&record, &time_label(now), &self.thresholds);
        info!("{}", dashboard.summary.line());
        if let Some(text) = dashboard.warning {
            warn!("{} ({})", text, exceeded_labels(&dashboard.exceeded));
        }

        if let Some(ref forwarder) = self.forwarder {
            // Detached: completion is only logged
            forwarder.forward(&record);
        }

        Ok(record)
    }
}

/// Comma-separated labels of the metrics over threshold.
pub fn exceeded_labels(metrics: &[Metric]) -> String {
    metrics.iter().map(|m| m.label()).collect::<Vec<_>>().join(", ")
}

/// Time-of-day label for the chart x axis.
pub fn time_label(now: DateTime<Local>) -> String {
    now.format("%H:%M:%S").to_string()
}
