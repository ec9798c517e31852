//! Toast notification component

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::TICKS_PER_SECOND;
use crate::ui::Theme;

/// Notification severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Toast notification
pub struct Notification {
    /// Message to display
    pub message: String,
    /// Severity level
    pub level: NotificationLevel,
    /// Remaining ticks until dismissal
    pub ttl: u64,
}

impl Notification {
    /// Create a notification that lives for `seconds`
    pub fn new(message: impl Into<String>, level: NotificationLevel, seconds: u64) -> Self {
        Self {
            message: message.into(),
            level,
            ttl: seconds * TICKS_PER_SECOND,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info, 3)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Success, 3)
    }

    /// Warnings stay up longer so forced logouts are noticed
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Warning, 6)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error, 6)
    }

    pub fn is_expired(&self) -> bool {
        self.ttl == 0
    }

    pub fn tick(&mut self) {
        self.ttl = self.ttl.saturating_sub(1);
    }

    pub fn icon(&self) -> &'static str {
        match self.level {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Success => "✓",
            NotificationLevel::Warning => "⚠",
            NotificationLevel::Error => "✗",
        }
    }

    /// Render the notification at the top-right of `area`
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = match self.level {
            NotificationLevel::Info => theme.info(),
            NotificationLevel::Success => theme.success(),
            NotificationLevel::Warning => theme.warning(),
            NotificationLevel::Error => theme.danger(),
        };

        let width = ((self.message.chars().count() + 6).min(60) as u16).min(area.width);
        let height = 3.min(area.height);
        let x = area.x + area.width.saturating_sub(width + 2);
        let y = area.y + 1.min(area.height.saturating_sub(height));
        let toast_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, toast_area);

        let block = Block::default().borders(Borders::ALL).border_style(style);
        let content = Paragraph::new(format!("{} {}", self.icon(), self.message))
            .style(style)
            .alignment(Alignment::Center)
            .block(block);

        frame.render_widget(content, toast_area);
    }
}

/// Stack of active toasts
pub struct NotificationManager {
    notifications: Vec<Notification>,
    max_visible: usize,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: Vec::new(),
            max_visible: 3,
        }
    }

    /// Add a notification, dropping the oldest past the visible limit
    pub fn push(&mut self, notification: Notification) {
        self.notifications.push(notification);
        while self.notifications.len() > self.max_visible {
            self.notifications.remove(0);
        }
    }

    /// Tick all notifications and remove expired
    pub fn tick(&mut self) {
        for n in &mut self.notifications {
            n.tick();
        }
        self.notifications.retain(|n| !n.is_expired());
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        for (i, notification) in self.notifications.iter().enumerate() {
            let offset_y = (i * 4) as u16;
            if offset_y >= area.height {
                break;
            }
            let adjusted_area = Rect::new(
                area.x,
                area.y + offset_y,
                area.width,
                area.height - offset_y,
            );
            notification.render(frame, adjusted_area, theme);
        }
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}
