//! Common UI components shared across views.
//!
//! This module contains the header bar, warning banner, tab bar, status bar,
//! and help overlay.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::Metric;
use crate::processor::exceeded_labels;

/// Render the header bar with the latest reading of every metric.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = &app.dashboard;

    let mut spans = vec![Span::styled(
        " ENVWATCH ",
        Style::default().add_modifier(Modifier::BOLD),
    )];

    if dashboard.applied == 0 {
        spans.push(Span::raw("│ Waiting for first reading..."));
    } else {
        for metric in Metric::ALL {
            let exceeded = dashboard.exceeded.contains(&metric);
            spans.push(Span::raw("│ "));
            spans.push(Span::styled(
                dashboard.summary.get(metric).to_string(),
                app.theme.reading_style(exceeded),
            ));
            spans.push(Span::raw(" "));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the threshold warning banner, or a blank line while it is hidden.
pub fn render_warning(frame: &mut Frame, app: &App, area: Rect) {
    let Some(text) = app.dashboard.warning else {
        frame.render_widget(Paragraph::new(""), area);
        return;
    };

    let banner = format!(" {} ({}) ", text, exceeded_labels(&app.dashboard.exceeded));

    let paragraph = Paragraph::new(banner)
        .alignment(Alignment::Center)
        .style(app.theme.warning_style());
    frame.render_widget(paragraph, area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, record counters, forwarding target, time since last
/// reading and available controls. Source errors replace the timing.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = &app.dashboard;

    let forwarding = match app.processor().forwarder() {
        Some(forwarder) => format!("→ {}", forwarder.url()),
        None => "forwarding off".to_string(),
    };

    let freshness = if let Some(ref err) = app.load_error {
        format!("Source: {}", err)
    } else if let Some(updated) = dashboard.last_updated {
        format!("Updated {:.1}s ago", updated.elapsed().as_secs_f64())
    } else {
        "Waiting...".to_string()
    };

    let status = format!(
        " {} | {} ok {} bad | {} | {} | Tab:switch ?:help q:quit",
        app.source_description(),
        dashboard.applied,
        dashboard.rejected,
        forwarding,
        freshness,
    );

    let style = if app.load_error.is_some() {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let thresholds = app.processor().thresholds();

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  Tab         Next view"),
        Line::from("  1-4         Jump to view"),
        Line::from("  Esc         Back to overview"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Warning thresholds",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(format!("  Temperature > {} °C", thresholds.temperature)),
        Line::from(format!("  Air Quality > {} ppm", thresholds.air_quality)),
        Line::from(format!("  Sound Level > {} dB", thresholds.sound_level)),
        Line::from(""),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
