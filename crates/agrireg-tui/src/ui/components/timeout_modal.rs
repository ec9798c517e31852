//! "Session expiring soon" dialog

use agrireg_session::{CountdownAction, CountdownModal};
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::ui::{layout::centered_rect_fixed, Theme};

pub const TITLE: &str = "Session Expiring Soon";

/// Map a key press to the modal's choices
pub fn action_for_key(key: KeyCode) -> Option<CountdownAction> {
    match key {
        KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => Some(CountdownAction::Extend),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(CountdownAction::LogoutNow),
        _ => None,
    }
}

/// Blocking overlay shown while the idle warning is active
pub struct TimeoutModal<'a> {
    modal: &'a CountdownModal,
}

impl<'a> TimeoutModal<'a> {
    pub fn new(modal: &'a CountdownModal) -> Self {
        Self { modal }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let dialog_area = centered_rect_fixed(48, 11, area);

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(format!(" {} ", TITLE))
            .title_style(theme.warning())
            .borders(Borders::ALL)
            .border_style(theme.warning());

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(2), // Message
                Constraint::Length(2), // Countdown
                Constraint::Min(0),
                Constraint::Length(1), // Buttons
            ])
            .split(inner);

        let message = Paragraph::new("You have been inactive. You will be logged out in")
            .style(theme.text())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[0]);

        let countdown = Paragraph::new(self.modal.label())
            .style(theme.countdown(self.modal.remaining_seconds))
            .alignment(Alignment::Center);
        frame.render_widget(countdown, chunks[1]);

        let buttons = Line::from(vec![
            Span::styled(" [E] Stay logged in ", theme.button_primary()),
            Span::raw("  "),
            Span::styled(" [L] Logout now ", theme.button_secondary()),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use rstest::rstest;

    #[rstest]
    #[case(KeyCode::Char('e'), Some(CountdownAction::Extend))]
    #[case(KeyCode::Char('E'), Some(CountdownAction::Extend))]
    #[case(KeyCode::Enter, Some(CountdownAction::Extend))]
    #[case(KeyCode::Char('l'), Some(CountdownAction::LogoutNow))]
    #[case(KeyCode::Char('L'), Some(CountdownAction::LogoutNow))]
    #[case(KeyCode::Esc, None)]
    #[case(KeyCode::Char('q'), None)]
    #[case(KeyCode::Down, None)]
    fn test_action_for_key(#[case] key: KeyCode, #[case] expected: Option<CountdownAction>) {
        assert_eq!(action_for_key(key), expected);
    }

    #[test]
    fn test_renders_title_and_countdown() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let modal = CountdownModal {
            visible: true,
            remaining_seconds: 125,
        };
        let theme = Theme::default();

        terminal
            .draw(|frame| TimeoutModal::new(&modal).render(frame, frame.area(), &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains(TITLE));
        assert!(text.contains("2:05"));
        assert!(text.contains("Stay logged in"));
        assert!(text.contains("Logout now"));
    }
}
