//! Login screen

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{App, LoginField};
use crate::ui::layout::centered_rect_fixed;
use crate::ui::Theme;

/// Draw the login form
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let state = &app.state;

    let dialog = centered_rect_fixed(56, 17, area);

    let block = Block::default()
        .title(" Sign In ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(2), // Error message
            Constraint::Min(0),
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let title = Paragraph::new("☘ AGRIREG Field Console")
        .style(theme.title())
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_field(
        frame,
        chunks[1],
        "Email",
        &state.email_input,
        state.login_field == LoginField::Email,
        theme,
    );

    // Password is masked
    let masked = "●".repeat(state.password_input.chars().count());
    draw_field(
        frame,
        chunks[2],
        "Password",
        &masked,
        state.login_field == LoginField::Password,
        theme,
    );

    if let Some(error) = &state.error_message {
        let error_widget = Paragraph::new(error.as_str())
            .style(theme.danger())
            .alignment(Alignment::Center);
        frame.render_widget(error_widget, chunks[3]);
    }

    let help = Paragraph::new("[Tab] Switch field  [Enter] Sign in  [Esc] Quit")
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[5]);
}

fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) {
    let border = if focused {
        theme.border_focused()
    } else {
        theme.border()
    };
    let cursor = if focused { "▏" } else { "" };

    let field = Paragraph::new(format!("{}{}", value, cursor))
        .style(theme.input(focused))
        .block(
            Block::default()
                .title(format!(" {} ", label))
                .borders(Borders::ALL)
                .border_style(border),
        );
    frame.render_widget(field, area);
}
