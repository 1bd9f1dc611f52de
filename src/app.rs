//! Application state and navigation logic.

use std::time::Duration;

use crate::data::{Dashboard, Metric};
use crate::processor::RecordProcessor;
use crate::source::DataSource;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// All three charts stacked.
    Overview,
    /// A single chart filling the content area.
    Single(Metric),
}

impl View {
    /// Views in tab order.
    pub const ALL: [View; 4] = [
        View::Overview,
        View::Single(Metric::Temperature),
        View::Single(Metric::AirQuality),
        View::Single(Metric::SoundLevel),
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|&v| v == self).unwrap_or(0)
    }

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Zero-based tab index.
    pub fn index(self) -> usize {
        self.position()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Single(metric) => metric.label(),
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source and processing
    source: Box<dyn DataSource>,
    processor: RecordProcessor,
    pub dashboard: Dashboard,
    pub load_error: Option<String>,

    // UI
    pub theme: Theme,
}

impl App {
    /// Create a new App reading from `source`.
    pub fn new(
        source: Box<dyn DataSource>,
        processor: RecordProcessor,
        dashboard: Dashboard,
    ) -> Self {
        Self::with_theme(source, processor, dashboard, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme (skips terminal detection).
    pub fn with_theme(
        source: Box<dyn DataSource>,
        processor: RecordProcessor,
        dashboard: Dashboard,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            source,
            processor,
            dashboard,
            load_error: None,
            theme,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// True once the source has ended and all its lines were processed.
    pub fn source_finished(&self) -> bool {
        self.source.is_finished()
    }

    pub fn processor(&self) -> &RecordProcessor {
        &self.processor
    }

    /// Process every line the source has ready, in arrival order.
    ///
    /// Returns the number of records applied to the dashboard.
    pub fn reload_data(&mut self) -> usize {
        let mut applied = 0;

        while let Some(line) = self.source.poll() {
            if self.processor.process_line(&mut self.dashboard, &line).is_ok() {
                applied += 1;
            }
        }

        self.load_error = self.source.error();
        applied
    }

    /// Give in-flight backend requests up to `timeout` to finish.
    ///
    /// Returns the number of requests abandoned. Must be called from
    /// outside the runtime's async context.
    pub fn shutdown(&self, timeout: Duration) -> usize {
        match self.processor.forwarder() {
            Some(forwarder) => forwarder.shutdown(timeout),
            None => 0,
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Navigate back: close help first, then return to the overview.
    pub fn go_back(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else {
            self.current_view = View::Overview;
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
