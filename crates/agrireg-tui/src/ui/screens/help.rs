//! Help screen

use agrireg_session::format_remaining;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::ui::layout::{render_footer, render_header, section_block, ScreenLayout};

/// Draw the help screen
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let layout = ScreenLayout::new(area);
    let config = app.store.config();

    render_header(frame, layout.header, Some("Help"), theme);

    let heading = |text: &'static str| Line::from(Span::styled(text, theme.text_highlight()));

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "  AGRIREG - Agricultural Registry Field Console",
            theme.title(),
        )),
        Line::from(""),
        heading("  Navigation:"),
        Line::from("    j/k or Up/Down  - Move selection"),
        Line::from("    Enter           - Open section"),
        Line::from("    r               - Reload last section"),
        Line::from("    t               - Refresh access token"),
        Line::from("    o               - Logout"),
        Line::from("    q               - Quit"),
        Line::from(""),
        heading("  Session timeout:"),
        Line::from(format!(
            "    After {} without activity a warning appears.",
            format_remaining(config.warning_threshold().as_secs())
        )),
        Line::from(format!(
            "    After {} the session ends and you return to sign in.",
            format_remaining(config.hard_threshold().as_secs())
        )),
        Line::from("    Opening a section counts as activity."),
        Line::from("    In the warning: [E] stays logged in, [L] logs out now."),
    ])
    .style(theme.text())
    .block(section_block("Help", theme));
    frame.render_widget(content, layout.content);

    render_footer(frame, layout.footer, &[("Esc", "Back")], theme);
}
