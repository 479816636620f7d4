//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;
use serde::{Deserialize, Serialize};

use crate::quiz::parse_hex_color;

/// Terminal background luma above which the light palette is used.
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

/// Theme preference from the config file.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Detect from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

/// Pick the palette for a theme preference. `Auto` queries the terminal and
/// falls back to dark when the terminal does not answer.
pub fn resolve_theme(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Dark => ThemeColors::dark(),
        Theme::Light => ThemeColors::light(),
        Theme::Auto => match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA_THRESHOLD => ThemeColors::light(),
            _ => ThemeColors::dark(),
        },
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score-based colors (traffic light pattern)
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,
    pub bar_empty: Color,

    // General colors
    pub text: Color,
    pub muted: Color,
    pub title_color: Color,

    // Option list
    pub option_selected: Style,
    pub checked_color: Color,
    pub severity_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    pub divider_color: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            score_high: Color::Red,
            score_mid: Color::Yellow,
            score_low: Color::Green,
            bar_empty: Color::DarkGray,
            text: Color::White,
            muted: Color::Gray,
            title_color: Color::Cyan,
            option_selected: Style::new().reversed(),
            checked_color: Color::Red,
            severity_color: Color::Indexed(203),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            divider_color: Color::Indexed(238),
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    pub fn light() -> Self {
        Self {
            score_high: Color::Red,
            score_mid: Color::Indexed(130),
            score_low: Color::Indexed(28),
            bar_empty: Color::Indexed(250),
            text: Color::Black,
            muted: Color::Indexed(242),
            title_color: Color::Blue,
            option_selected: Style::new().reversed(),
            checked_color: Color::Indexed(160),
            severity_color: Color::Indexed(160),
            status_bar_bg: Color::Indexed(254),
            status_key_color: Color::Blue,
            flash_success: Color::Indexed(28),
            flash_error: Color::Red,
            divider_color: Color::Indexed(252),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(255),
        }
    }

    /// Returns the appropriate color for a score based on its percentage of max score
    pub fn score_color(&self, score: f64, max_score: f64) -> Color {
        let percentage = if max_score > 0.0 {
            (score / max_score) * 100.0
        } else {
            0.0
        };

        if percentage >= 70.0 {
            self.score_high
        } else if percentage >= 40.0 {
            self.score_mid
        } else {
            self.score_low
        }
    }

    /// Color for a `#rrggbb` string from quiz data, or the title color if
    /// it does not parse.
    pub fn hex(&self, color: &str) -> Color {
        hex_color(color).unwrap_or(self.title_color)
    }
}

pub fn hex_color(color: &str) -> Option<Color> {
    parse_hex_color(color).map(|(r, g, b)| Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_color_bands() {
        let colors = ThemeColors::dark();
        assert_eq!(colors.score_color(80.0, 100.0), Color::Red);
        assert_eq!(colors.score_color(46.0, 100.0), Color::Yellow);
        assert_eq!(colors.score_color(10.0, 100.0), Color::Green);
        assert_eq!(colors.score_color(5.0, 0.0), Color::Green);
    }

    #[test]
    fn test_hex() {
        let colors = ThemeColors::dark();
        assert_eq!(colors.hex("#fb923c"), Color::Rgb(0xfb, 0x92, 0x3c));
        assert_eq!(colors.hex("orange"), colors.title_color);
    }

    #[test]
    fn test_explicit_themes_skip_detection() {
        assert_eq!(resolve_theme(Theme::Light).text, Color::Black);
        assert_eq!(resolve_theme(Theme::Dark).text, Color::White);
    }
}
