//! Status bar component

use std::time::Duration;

use agrireg_session::{format_remaining, SessionStore};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::Theme;

/// Session indicators shown under the dashboard
#[derive(Debug, Default)]
pub struct SessionStatus {
    /// Display name of the signed-in user
    pub user: Option<String>,
    /// Primary role
    pub role: Option<String>,
    pub idle: Option<Duration>,
    /// Time until the idle logout
    pub remaining: Option<Duration>,
    /// Whether the idle warning is up
    pub warning: bool,
}

impl SessionStatus {
    pub fn from_store(store: &SessionStore) -> Self {
        let credentials = store.credentials();
        Self {
            user: credentials
                .as_ref()
                .map(|c| c.user.display_name().to_string()),
            role: credentials.and_then(|c| c.role),
            idle: store.idle_time(),
            remaining: store.remaining(),
            warning: store.warning_active(),
        }
    }
}

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, area: Rect, status: &SessionStatus, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme.border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(35),
        ])
        .split(inner);

    // Left: user and role
    let (indicator, indicator_style) = theme.session_indicator(status.user.is_some());
    let mut left = vec![Span::styled(format!("{} ", indicator), indicator_style)];
    if let Some(user) = &status.user {
        left.push(Span::styled(user.clone(), theme.text()));
    }
    if let Some(role) = &status.role {
        left.push(Span::styled(format!(" ({})", role), theme.text_secondary()));
    }
    frame.render_widget(Paragraph::new(Line::from(left)), chunks[0]);

    if let Some(idle) = status.idle {
        let idle_text = format!("Idle {}", format_remaining(idle.as_secs()));
        frame.render_widget(
            Paragraph::new(idle_text)
                .style(theme.text_muted())
                .alignment(Alignment::Center),
            chunks[1],
        );
    }

    // Right: time until the idle logout
    if let Some(remaining) = status.remaining {
        let text = format!("Logout in {}", format_remaining(remaining.as_secs()));
        frame.render_widget(
            Paragraph::new(text)
                .style(theme.session_remaining(status.warning))
                .alignment(Alignment::Right),
            chunks[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrireg_session::SessionConfig;

    #[test]
    fn test_status_without_session_is_empty() {
        let store = SessionStore::new(SessionConfig::default()).unwrap();
        let status = SessionStatus::from_store(&store);

        assert!(status.user.is_none());
        assert!(status.idle.is_none());
        assert!(status.remaining.is_none());
        assert!(!status.warning);
    }
}
