//! Dashboard screen - registry sections menu

use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph, Wrap};

use crate::app::{App, MENU_ITEMS};
use crate::ui::components::status_bar::{render_status_bar, SessionStatus};
use crate::ui::layout::{render_footer, render_header, section_block, ScreenLayout};

/// Draw the dashboard
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let state = &app.state;
    let layout = ScreenLayout::new(area);

    render_header(frame, layout.header, Some("Dashboard"), theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)])
        .split(layout.content);

    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, (title, _))| {
            let selected = i == state.menu_index;
            let marker = if selected { "▶" } else { " " };
            ListItem::new(format!(" {} {}", marker, title)).style(theme.menu_item(selected))
        })
        .collect();

    let menu = List::new(items).block(section_block("Registry", theme));
    frame.render_widget(menu, body[0]);

    // Section detail
    let mut lines = Vec::new();
    match state.last_section {
        Some(section) => {
            lines.push(Line::from(Span::styled(section, theme.text_highlight())));
            lines.push(Line::from(""));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Select a section and press Enter",
                theme.text_muted(),
            )));
        }
    }
    if let Some(status) = &state.status_message {
        lines.push(Line::from(Span::styled(status.as_str(), theme.success())));
    }
    if let Some(error) = &state.error_message {
        lines.push(Line::from(Span::styled(error.as_str(), theme.danger())));
    }

    let detail = Paragraph::new(lines)
        .block(section_block("Details", theme))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, body[1]);

    render_status_bar(
        frame,
        layout.status,
        &SessionStatus::from_store(&app.store),
        theme,
    );

    render_footer(
        frame,
        layout.footer,
        &[
            ("↑↓", "Navigate"),
            ("Enter", "Open"),
            ("r", "Reload"),
            ("t", "Refresh token"),
            ("o", "Logout"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        theme,
    );
}
