//! Chart rendering.
//!
//! One line chart per metric. The overview stacks all three; the
//! single-metric views give one chart the whole content area.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::{App, View};
use crate::data::{format_number, ChartSeries, Metric};

/// Render the chart area for the current view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_view {
        View::Overview => {
            let rows = Layout::vertical([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

            for (metric, row) in Metric::ALL.into_iter().zip(rows.iter()) {
                render_metric(frame, app, metric, *row);
            }
        }
        View::Single(metric) => render_metric(frame, app, metric, area),
    }
}

/// Render one metric's chart into `area`.
pub fn render_metric(frame: &mut Frame, app: &App, metric: Metric, area: Rect) {
    let series = app.dashboard.series(metric);
    let color = app.theme.metric_color(metric);
    let exceeded = app.dashboard.exceeded.contains(&metric);

    let title = match series.latest() {
        Some(latest) => format!(" {}  {} ", metric.title(), format_number(latest)),
        None => format!(" {} ", metric.title()),
    };

    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(if exceeded {
            Style::default().fg(app.theme.warning)
        } else {
            Style::default().fg(app.theme.border)
        });

    if series.is_empty() {
        let waiting = Paragraph::new("Waiting for data...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    let points = series.points();
    let dataset = Dataset::default()
        .name(metric.title())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let limit = app.processor().thresholds().limit(metric);
    let [y_min, y_max] = series.y_bounds();

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Time")
                .style(Style::default().fg(app.theme.border))
                .bounds(series.x_bounds())
                .labels(x_labels(series)),
        )
        .y_axis(
            Axis::default()
                .title(metric.unit())
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(y_labels(y_min, y_max, limit)),
        );

    frame.render_widget(chart, area);
}

/// First and last timestamp of the series.
fn x_labels(series: &ChartSeries) -> Vec<Line<'static>> {
    let first = series.first_label().unwrap_or_default().to_string();
    let last = series.last_label().unwrap_or_default().to_string();
    vec![Line::from(first), Line::from(last)]
}

/// Min, mid and max of the y range; the mid label is the threshold when it
/// falls inside the visible range.
fn y_labels(min: f64, max: f64, limit: f64) -> Vec<Line<'static>> {
    let mid = if limit > min && limit < max {
        limit
    } else {
        (min + max) / 2.0
    };
    [min, mid, max]
        .into_iter()
        .map(|v| Line::from(format!("{:.1}", v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dashboard, Thresholds};
    use crate::processor::RecordProcessor;
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_y_labels_use_threshold_when_visible() {
        let labels = y_labels(20.0, 40.0, 30.0);
        assert_eq!(labels[1], Line::from("30.0"));

        let labels = y_labels(20.0, 25.0, 30.0);
        assert_eq!(labels[1], Line::from("22.5"));
    }

    #[test]
    fn test_render_overview() {
        let (tx, source) = ChannelSource::create("test");
        let processor = RecordProcessor::new(Thresholds::default(), None);
        let mut app =
            App::with_theme(Box::new(source), processor, Dashboard::default(), Theme::dark());

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();
        assert!(buffer_text(&terminal).contains("Waiting for data"));

        tx.send(b"{\"temperature\":21,\"airQuality\":120,\"soundLevel\":40}\n".to_vec())
            .unwrap();
        tx.send(b"{\"temperature\":22,\"airQuality\":125,\"soundLevel\":42}\n".to_vec())
            .unwrap();
        app.reload_data();

        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Temperature (°C)"));
        assert!(text.contains("Air Quality (ppm)"));
        assert!(text.contains("Sound Level (dB)"));
        assert!(!text.contains("Waiting for data"));
    }
}
