//! Console palette and semantic styles

use ratatui::style::{Color, Modifier, Style};

/// Seconds left at which the countdown turns red
pub const COUNTDOWN_URGENT_SECS: u64 = 10;

/// Colors for the field console
///
/// Greens for the registry brand, amber for the idle warning and red for an
/// imminent logout.
pub struct Theme {
    pub field_green: Color,
    pub harvest_gold: Color,
    pub soil_dark: Color,

    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,

    pub border: Color,
    pub border_focused: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            field_green: Color::Rgb(46, 125, 50),   // #2E7D32
            harvest_gold: Color::Rgb(249, 168, 37), // #F9A825
            soil_dark: Color::Rgb(33, 33, 33),      // #212121

            success: Color::Rgb(76, 175, 80), // #4CAF50
            warning: Color::Rgb(239, 108, 0), // #EF6C00
            danger: Color::Rgb(244, 67, 54),  // #F44336
            info: Color::Rgb(33, 150, 243),   // #2196F3

            border: Color::Rgb(66, 66, 66),            // #424242
            border_focused: Color::Rgb(102, 187, 106), // #66BB6A
            text_primary: Color::Rgb(250, 250, 250),   // #FAFAFA
            text_secondary: Color::Rgb(189, 189, 189), // #BDBDBD
            text_muted: Color::Rgb(117, 117, 117),     // #757575
            selection: Color::Rgb(55, 71, 56),         // #374738
        }
    }
}

impl Theme {
    pub fn text(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn text_highlight(&self) -> Style {
        Style::default()
            .fg(self.harvest_gold)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.field_green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn danger(&self) -> Style {
        Style::default()
            .fg(self.danger)
            .add_modifier(Modifier::BOLD)
    }

    pub fn info(&self) -> Style {
        Style::default().fg(self.info)
    }

    /// Dashboard menu entry
    pub fn menu_item(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .bg(self.selection)
                .fg(self.harvest_gold)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text_primary)
        }
    }

    /// Login form field
    pub fn input(&self, focused: bool) -> Style {
        let fg = if focused {
            self.text_primary
        } else {
            self.text_secondary
        };
        Style::default().fg(fg).bg(self.soil_dark)
    }

    /// "Stay logged in"
    pub fn button_primary(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.field_green)
            .add_modifier(Modifier::BOLD)
    }

    /// "Logout now"
    pub fn button_secondary(&self) -> Style {
        Style::default().fg(self.text_primary).bg(self.border)
    }

    /// Countdown digits in the expiry modal
    pub fn countdown(&self, remaining_seconds: u64) -> Style {
        if remaining_seconds <= COUNTDOWN_URGENT_SECS {
            self.danger().add_modifier(Modifier::SLOW_BLINK)
        } else {
            self.text_highlight()
        }
    }

    /// "Logout in m:ss" on the status bar
    pub fn session_remaining(&self, warning: bool) -> Style {
        if warning {
            self.warning()
        } else {
            self.text_secondary()
        }
    }

    /// Dot in front of the signed-in user
    pub fn session_indicator(&self, active: bool) -> (&'static str, Style) {
        if active {
            ("●", self.success())
        } else {
            ("○", self.text_muted())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_turns_red_when_urgent() {
        let theme = Theme::default();
        assert_eq!(theme.countdown(COUNTDOWN_URGENT_SECS).fg, Some(theme.danger));
        assert_eq!(theme.countdown(0).fg, Some(theme.danger));
        assert_eq!(theme.countdown(COUNTDOWN_URGENT_SECS + 1).fg, Some(theme.harvest_gold));
    }

    #[test]
    fn test_session_remaining_highlights_warning() {
        let theme = Theme::default();
        assert_eq!(theme.session_remaining(true).fg, Some(theme.warning));
        assert_eq!(theme.session_remaining(false).fg, Some(theme.text_secondary));
    }
}
