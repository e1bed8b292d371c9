//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::grading::{GradeBand, TargetStatus};

/// Theme setting from config (`theme: auto | dark | light`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Auto,
    Dark,
    Light,
}

impl Theme {
    /// Unknown values fall back to `Auto`; config validation reports them.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some("dark") => Theme::Dark,
            Some("light") => Theme::Light,
            _ => Theme::Auto,
        }
    }
}

/// Pick a palette. `Auto` queries the terminal background and falls back to
/// dark when the terminal does not answer.
pub fn resolve_theme(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Dark => ThemeColors::dark(),
        Theme::Light => ThemeColors::light(),
        Theme::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => ThemeColors::light(),
            Ok(_) => ThemeColors::dark(),
            Err(e) => {
                tracing::debug!("terminal background detection failed: {}", e);
                ThemeColors::dark()
            }
        },
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Target status colors
    pub achieved: Color,
    pub needed: Color,
    pub missed: Color,

    // Form colors
    pub field_label: Color,
    pub field_focused: Style,
    pub field_value: Color,
    pub quality_active: Style,
    pub quality_inactive: Color,

    // Styles
    pub title_style: Style,
    pub header_style: Style,
    pub total_style: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub border: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_warning: Color,
    pub flash_info: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,

    // Unavailable banner colors
    pub banner_bg: Color,
    pub banner_fg: Color,
    pub banner_key: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            achieved: Color::Green,
            needed: Color::Yellow,
            missed: Color::Red,
            field_label: Color::Gray,
            field_focused: Style::new().fg(Color::Cyan).bold(),
            field_value: Color::White,
            quality_active: Style::new().fg(Color::Black).bg(Color::Cyan).bold(),
            quality_inactive: Color::DarkGray,
            title_style: Style::new().bold(),
            header_style: Style::new().bold(),
            total_style: Style::new().fg(Color::White).bold(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            border: Color::Indexed(238),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_warning: Color::Yellow,
            flash_info: Color::Green,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            banner_bg: Color::Rgb(120, 30, 30),
            banner_fg: Color::White,
            banner_key: Color::Yellow,
        }
    }

    pub fn light() -> Self {
        Self {
            achieved: Color::Rgb(21, 128, 61),
            needed: Color::Rgb(180, 83, 9),
            missed: Color::Rgb(185, 28, 28),
            field_label: Color::DarkGray,
            field_focused: Style::new().fg(Color::Blue).bold(),
            field_value: Color::Black,
            quality_active: Style::new().fg(Color::White).bg(Color::Blue).bold(),
            quality_inactive: Color::Gray,
            title_style: Style::new().bold(),
            header_style: Style::new().bold(),
            total_style: Style::new().fg(Color::Black).bold(),
            muted: Color::DarkGray,
            title_color: Color::Blue,
            border: Color::Indexed(250),
            status_bar_bg: Color::Indexed(254),
            status_key_color: Color::Blue,
            flash_warning: Color::Rgb(180, 83, 9),
            flash_info: Color::Rgb(21, 128, 61),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            banner_bg: Color::Rgb(254, 226, 226),
            banner_fg: Color::Rgb(127, 29, 29),
            banner_key: Color::Rgb(127, 29, 29),
        }
    }

    pub fn status_color(&self, status: &TargetStatus) -> Color {
        match status {
            TargetStatus::Achieved => self.achieved,
            TargetStatus::Needed(_) => self.needed,
            TargetStatus::Missed | TargetStatus::Impossible => self.missed,
        }
    }

    /// The band's configured color, or the title color when it has none.
    pub fn band_color(&self, band: &GradeBand) -> Color {
        band.rgb()
            .map(|(r, g, b)| Color::Rgb(r, g, b))
            .unwrap_or(self.title_color)
    }
}
