// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # envwatch
//!
//! A terminal dashboard for environmental sensor telemetry.
//!
//! A microcontroller prints one JSON object per line over a serial link:
//!
//! ```text
//! {"temperature":23.4,"airQuality":180,"soundLevel":42}
//! ```
//!
//! Every valid record extends three live charts, refreshes the summary
//! values, shows or hides the threshold warning, and is forwarded as an
//! HTTP POST to a backend. Invalid lines are logged and skipped.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌───────────┐    ┌─────────┐    ┌──────────┐ │
//! │  │  app    │───▶│ processor │───▶│   ui    │───▶│ Terminal │ │
//! │  │ (state) │    │ (records) │    │(render) │    │          │ │
//! │  └────┬────┘    └─────┬─────┘    └─────────┘    └──────────┘ │
//! │       │               │                                      │
//! │       ▼               ▼                                      │
//! │  ┌─────────┐    ┌───────────┐                                │
//! │  │ source  │    │  forward  │──▶ POST http://host:port/data  │
//! │  │ (input) │    │  (HTTP)   │                                │
//! │  └─────────┘    └───────────┘                                │
//! │       ▲                                                      │
//! │       └── SerialSource | StreamSource | ChannelSource        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and the drain loop
//! - **[`source`]**: Line sources ([`DataSource`] trait) for serial ports,
//!   async streams (TCP, replay files) and in-process channels
//! - **[`data`]**: Sensor records, chart series, thresholds and the [`Dashboard`]
//! - **[`processor`]**: Parses each line, updates the dashboard, starts a forward
//! - **[`forward`]**: Fire-and-forget HTTP delivery of records
//! - **[`headless`]**: The same pipeline without a terminal
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`settings`]**: Layered configuration (defaults, TOML, environment)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Read the only attached serial device at 9600 baud
//! envwatch
//!
//! # Pick a port and a backend
//! envwatch --port /dev/ttyACM0 --host 192.168.1.20 --backend-port 5000
//!
//! # Replay a capture without a backend, logging to stderr
//! envwatch --replay capture.jsonl --no-forward --headless
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use envwatch::{App, ChannelSource, Dashboard, RecordProcessor, Thresholds};
//!
//! let (tx, source) = ChannelSource::create("test");
//! let processor = RecordProcessor::new(Thresholds::default(), None);
//! let mut app = App::new(Box::new(source), processor, Dashboard::default());
//!
//! tx.send(b"{\"temperature\":31,\"airQuality\":100,\"soundLevel\":40}\n".to_vec())
//!     .unwrap();
//! assert_eq!(app.reload_data(), 1);
//! assert!(app.dashboard.warning_visible());
//! ```
//!
//! ### As a library with a stream source
//!
//! ```no_run
//! use std::io::Cursor;
//! use envwatch::{App, Dashboard, RecordProcessor, StreamSource, Thresholds};
//!
//! # tokio_test::block_on(async {
//! // In practice, use a TcpStream
//! let data = b"{\"temperature\":20,\"airQuality\":90,\"soundLevel\":35}\n";
//! let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
//! let processor = RecordProcessor::new(Thresholds::default(), None);
//! let app = App::new(Box::new(source), processor, Dashboard::default());
//! # });
//! ```

pub mod app;
pub mod data;
pub mod error;
pub mod events;
pub mod forward;
pub mod headless;
pub mod logging;
pub mod processor;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{ChartSeries, Dashboard, Metric, SensorRecord, Summary, Thresholds};
pub use error::{RecordError, SourceError};
pub use forward::Forwarder;
pub use processor::RecordProcessor;
pub use settings::{Overrides, Settings};
pub use source::{
    ChannelSource, DataSource, LineBuffer, SerialSource, SourceConfig, StreamSource,
};
