//! Running the pipeline without a terminal.
//!
//! Records are logged one by one by the processor; this loop only drains
//! the source, reports source errors and waits for outstanding forwards
//! once the source ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::app::App;
use crate::forward::SHUTDOWN_GRACE;

/// Totals for a finished headless session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessReport {
    pub applied: u64,
    pub rejected: u64,
    /// Records that raised the threshold warning.
    pub warnings: u64,
    /// Backend requests still unfinished when the grace period ran out.
    pub abandoned: usize,
}

/// Drain `app`'s source every `refresh_interval` until it finishes or
/// `stop` is set, then flush pending forwards.
///
/// Blocks the calling thread, which must not be a runtime worker.
pub fn run(app: &mut App, refresh_interval: Duration, stop: &AtomicBool) -> HeadlessReport {
    let mut last_error: Option<String> = None;

    loop {
        app.reload_data();

        if app.load_error != last_error {
            if let Some(ref err) = app.load_error {
                warn!("Source: {}", err);
            }
            last_error = app.load_error.clone();
        }

        if app.source_finished() || stop.load(Ordering::SeqCst) {
            break;
        }
        std::thread::sleep(refresh_interval);
    }

    let abandoned = app.shutdown(SHUTDOWN_GRACE);
    let dashboard = &app.dashboard;
    info!(
        "Finished: {} records, {} rejected lines, {} warnings",
        dashboard.applied, dashboard.rejected, dashboard.warnings
    );

    HeadlessReport {
        applied: dashboard.applied,
        rejected: dashboard.rejected,
        warnings: dashboard.warnings,
        abandoned,
    }
}
