//! UI rendering

pub mod components;
pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use ratatui::prelude::*;

use crate::app::{App, Screen};

/// Main render function - delegates to appropriate screen, then overlays
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.state.current_screen {
        Screen::Login => screens::login::draw(frame, area, app),
        Screen::Dashboard => screens::dashboard::draw(frame, area, app),
        Screen::Help => screens::help::draw(frame, area, app),
    }

    let modal = app.timeout.modal();
    if modal.visible {
        components::timeout_modal::TimeoutModal::new(&modal).render(frame, area, &app.theme);
    }

    app.notifications.render(frame, area, &app.theme);
}
