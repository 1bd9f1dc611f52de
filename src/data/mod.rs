//! Data models for sensor telemetry.
//!
//! ## Submodules
//!
//! - [`record`]: Parsing device lines into [`SensorRecord`]s
//! - [`metric`]: The three measured quantities ([`Metric`])
//! - [`series`]: Per-metric time series backing the charts ([`ChartSeries`])
//! - [`dashboard`]: Display state updated per record ([`Dashboard`], [`Thresholds`])
//!
//! ## Data Flow
//!
//! ```text
//! line (trimmed JSON)
//!        │
//!        ▼
//! SensorRecord::parse()
//!        │
//!        ▼
//! Dashboard::apply()
//!        │
//!        ├──▶ ChartSeries::append() ×3
//!        ├──▶ Summary::from_record()
//!        └──▶ Thresholds::exceeded_by() (warning)
//! ```

pub mod dashboard;
pub mod metric;
pub mod record;
pub mod series;

pub use dashboard::{Dashboard, Summary, Thresholds, WARNING_TEXT};
pub use metric::Metric;
pub use record::{format_number, format_tenths, SensorRecord};
pub use series::ChartSeries;
