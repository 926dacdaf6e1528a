//! Theme system for TUI colors and styles
//!
//! Colors match the CLI text output (owo-colors in `commands`).

use iocraft::prelude::Color;

use crate::notify::ToastLevel;

/// Theme configuration for TUI components
#[derive(Debug, Clone)]
pub struct Theme {
    // UI colors
    pub border: Color,
    pub border_focused: Color,
    pub background: Color,
    pub text: Color,
    pub text_dimmed: Color,
    pub highlight: Color,
    pub highlight_background: Color,
    pub search_match: Color,
    pub id_color: Color,

    // Selection
    pub checkbox_on: Color,
    pub tag: Color,
    pub error: Color,

    // Toast levels
    pub toast_info: Color,
    pub toast_warning: Color,
    pub toast_error: Color,
    pub toast_success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let grey = Color::Rgb {
            r: 120,
            g: 120,
            b: 120,
        };
        Self {
            border: grey,
            border_focused: Color::Blue,
            background: Color::Reset,
            text: Color::White,
            text_dimmed: grey,
            highlight: Color::Blue,
            highlight_background: Color::Rgb {
                r: 40,
                g: 44,
                b: 60,
            },
            search_match: Color::Yellow,
            id_color: Color::Cyan,

            checkbox_on: Color::Green,
            tag: Color::Magenta,
            error: Color::Red,

            toast_info: Color::Cyan,
            toast_warning: Color::Yellow,
            toast_error: Color::Red,
            toast_success: Color::Green,
        }
    }
}

impl Theme {
    /// Get the color for a toast level
    pub fn toast_color(&self, level: ToastLevel) -> Color {
        match level {
            ToastLevel::Info => self.toast_info,
            ToastLevel::Warning => self.toast_warning,
            ToastLevel::Error => self.toast_error,
            ToastLevel::Success => self.toast_success,
        }
    }
}

/// Global theme instance
pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);

/// Get a reference to the global theme
pub fn theme() -> &'static Theme {
    &THEME
}
