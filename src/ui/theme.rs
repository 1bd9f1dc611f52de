//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Metric;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Line color of the temperature chart.
    pub temperature: Color,
    /// Line color of the air quality chart.
    pub air_quality: Color,
    /// Line color of the sound level chart.
    pub sound_level: Color,
    /// Color for the threshold warning banner.
    pub warning: Color,
    /// Color for a metric reading within its threshold.
    pub healthy: Color,
    /// Color for borders, axes and separators.
    pub border: Color,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            temperature: Color::Rgb(255, 99, 132),
            air_quality: Color::Rgb(75, 192, 192),
            sound_level: Color::Rgb(153, 102, 255),
            warning: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            temperature: Color::Rgb(200, 40, 80),
            air_quality: Color::Rgb(20, 130, 130),
            sound_level: Color::Rgb(110, 60, 200),
            warning: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Line color for a metric's chart.
    pub fn metric_color(&self, metric: Metric) -> Color {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::AirQuality => self.air_quality,
            Metric::SoundLevel => self.sound_level,
        }
    }

    /// Style for a summary value, depending on whether it is over threshold.
    pub fn reading_style(&self, exceeded: bool) -> Style {
        if exceeded {
            Style::default().fg(self.warning).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.healthy)
        }
    }

    /// Style for the warning banner.
    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.warning)
            .add_modifier(Modifier::BOLD)
    }
}
