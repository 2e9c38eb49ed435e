//! Theme and Styling
//!
//! Light and dark palettes plus the style helpers used by the renderer.

use crate::page::ThemeMode;
use crate::report::Rating;
use ratatui::style::{Color, Modifier, Style};

/// Colour palette for one theme mode
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_dim: Color,

    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_highlight: Color,

    pub border: Color,
    pub border_focused: Color,

    pub user: Color,
    pub bot: Color,
}

pub const DARK: Theme = Theme {
    accent: Color::Rgb(0, 212, 255),
    success: Color::Rgb(34, 197, 94),
    warning: Color::Rgb(251, 191, 36),
    error: Color::Rgb(239, 68, 68),
    text_primary: Color::Rgb(229, 229, 229),
    text_secondary: Color::Rgb(161, 161, 161),
    text_dim: Color::Rgb(82, 82, 82),
    bg_primary: Color::Rgb(10, 10, 10),
    bg_secondary: Color::Rgb(26, 26, 26),
    bg_highlight: Color::Rgb(38, 38, 38),
    border: Color::Rgb(51, 51, 51),
    border_focused: Color::Rgb(59, 130, 246),
    user: Color::Rgb(34, 197, 94),
    bot: Color::Rgb(0, 212, 255),
};

pub const LIGHT: Theme = Theme {
    accent: Color::Rgb(0, 105, 92),
    success: Color::Rgb(21, 128, 61),
    warning: Color::Rgb(180, 83, 9),
    error: Color::Rgb(185, 28, 28),
    text_primary: Color::Rgb(23, 23, 23),
    text_secondary: Color::Rgb(82, 82, 82),
    text_dim: Color::Rgb(163, 163, 163),
    bg_primary: Color::Rgb(250, 250, 250),
    bg_secondary: Color::Rgb(241, 241, 241),
    bg_highlight: Color::Rgb(226, 232, 240),
    border: Color::Rgb(203, 213, 225),
    border_focused: Color::Rgb(37, 99, 235),
    user: Color::Rgb(21, 128, 61),
    bot: Color::Rgb(0, 105, 92),
};

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> &'static Theme {
        match mode {
            ThemeMode::Dark => &DARK,
            ThemeMode::Light => &LIGHT,
        }
    }

    /// Background of the root frame
    pub fn root(&self) -> Style {
        Style::default().fg(self.text_primary).bg(self.bg_primary)
    }

    pub fn surface(&self) -> Style {
        Style::default().fg(self.text_primary).bg(self.bg_secondary)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn heading(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn border_for(&self, focused: bool) -> Style {
        if focused {
            self.border_focused()
        } else {
            self.border()
        }
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn user_message(&self) -> Style {
        Style::default().fg(self.user).add_modifier(Modifier::BOLD)
    }

    pub fn bot_message(&self) -> Style {
        Style::default().fg(self.bot).add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_key(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_desc(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn active(&self) -> Style {
        Style::default().fg(self.warning).add_modifier(Modifier::BOLD)
    }

    pub fn complete(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn pending(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn code(&self) -> Style {
        Style::default().fg(self.accent).bg(self.bg_highlight)
    }

    pub fn badge_success(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.success)
            .add_modifier(Modifier::BOLD)
    }

    pub fn badge_muted(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.text_dim)
            .add_modifier(Modifier::BOLD)
    }

    /// Heat-map colours, same in both modes
    pub fn rating(&self, rating: Rating) -> Style {
        let bg = match rating {
            Rating::VeryHigh => Color::Rgb(185, 28, 28),
            Rating::High => Color::Rgb(234, 88, 12),
            Rating::Medium => Color::Rgb(202, 138, 4),
            Rating::Low => Color::Rgb(101, 163, 13),
            Rating::VeryLow => Color::Rgb(21, 128, 61),
        };
        Style::default()
            .fg(Color::White)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }
}

/// Status icons
pub struct Icons;

impl Icons {
    pub const COMPLETE: &'static str = "✓";
    pub const ACTIVE: &'static str = "●";
    pub const PENDING: &'static str = "○";
    pub const ARROW: &'static str = "→";
    pub const CURSOR: &'static str = "▌";
    pub const SELECTED: &'static str = "▶";
    pub const BULLET: &'static str = "•";
    pub const SUN: &'static str = "☀";
    pub const MOON: &'static str = "☾";
    pub const SPINNER: [&'static str; 4] = ["◐", "◓", "◑", "◒"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_mode() {
        assert_eq!(Theme::for_mode(ThemeMode::Dark).bg_primary, DARK.bg_primary);
        assert_eq!(Theme::for_mode(ThemeMode::Light).bg_primary, LIGHT.bg_primary);
        assert_ne!(DARK.text_primary, LIGHT.text_primary);
    }

    #[test]
    fn test_rating_styles_are_distinct() {
        let ratings = [
            Rating::VeryHigh,
            Rating::High,
            Rating::Medium,
            Rating::Low,
            Rating::VeryLow,
        ];
        let backgrounds: std::collections::HashSet<_> =
            ratings.iter().map(|r| DARK.rating(*r).bg).collect();
        assert_eq!(backgrounds.len(), ratings.len());
    }
}
