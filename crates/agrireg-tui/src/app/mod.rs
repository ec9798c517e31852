//! Application state and event handling

mod config;
mod events;
mod state;

pub use config::{AccountConfig, ConfigError, ConsoleConfig};
pub use events::{session_events, AppEvent, TICKS_PER_SECOND, TICK_RATE};
pub use state::{AppState, LoginField, Screen, MAX_INPUT_LENGTH, MENU_ITEMS};

use std::sync::Arc;

use agrireg_session::{
    LogoutReason, OutgoingRequest, SessionFile, SessionInterceptor, SessionStore, SessionTimeout,
    SessionTimeoutHandle,
};
use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures::StreamExt;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::auth::AccountDirectory;
use crate::ui::components::notification::{Notification, NotificationManager};
use crate::ui::components::timeout_modal;
use crate::ui::{self, Theme};

/// Main application struct
pub struct App {
    /// Application state
    pub state: AppState,

    /// Visual theme
    pub theme: Theme,

    /// Session shared with the timeout timers
    pub store: SessionStore,

    /// Live timeout subsystem; dropping it cancels every timer
    pub timeout: SessionTimeoutHandle,

    /// Toast notifications
    pub notifications: NotificationManager,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Tick counter
    pub tick: u64,

    interceptor: SessionInterceptor,
    directory: Arc<AccountDirectory>,
    session_file: Option<SessionFile>,
    events: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create a new application instance
    ///
    /// Must be called inside a tokio runtime. Restores a persisted session
    /// when `session_file` holds one.
    pub fn new(config: ConsoleConfig, session_file: Option<SessionFile>) -> Result<Self> {
        let store = SessionStore::new(config.session).context("Invalid session thresholds")?;
        let events = session_events(&store);

        if let Some(file) = session_file.clone() {
            store.on_logout(move |_reason| {
                if let Err(e) = file.clear() {
                    warn!("Failed to clear session file: {}", e);
                }
            });
        }

        let timeout = SessionTimeout::spawn(store.clone());
        let interceptor = SessionInterceptor::new(store.clone());
        let directory = Arc::new(AccountDirectory::new(config.accounts));

        let mut app = Self {
            state: AppState::new(),
            theme: Theme::default(),
            store,
            timeout,
            notifications: NotificationManager::new(),
            should_quit: false,
            tick: 0,
            interceptor,
            directory,
            session_file,
            events,
        };

        app.restore_session();
        if app.directory.is_empty() && !app.store.is_active() {
            app.state.error_message =
                Some("No accounts configured. Add one with `agrireg hash-password`.".to_string());
        }
        Ok(app)
    }

    fn restore_session(&mut self) {
        let Some(file) = &self.session_file else {
            return;
        };
        match file.load() {
            Ok(Some(persisted)) => {
                self.store.restore(persisted);
                self.state.current_screen = Screen::Dashboard;
                info!("Restored persisted session");
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Ignoring unreadable session file: {}", e);
                if let Err(e) = file.clear() {
                    warn!("Failed to clear session file: {}", e);
                }
            }
        }
    }

    /// Run the application main loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut input = EventStream::new();
        let mut ticker = tokio::time::interval(TICK_RATE);

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                Some(event) = self.events.recv() => self.on_event(event),
                maybe = input.next() => match maybe {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code);
                    }
                    Some(Err(e)) => return Err(e).context("Terminal input failed"),
                    None => self.should_quit = true,
                    _ => {}
                },
            }
        }

        Ok(())
    }

    /// Periodic housekeeping
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.notifications.tick();

        // Redirect if the session vanished without an event reaching us.
        if self.state.current_screen != Screen::Login && !self.store.is_active() {
            self.redirect_to_login();
        }
    }

    /// Handle an event raised outside the key handler
    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionEnded(reason) => {
                let notification = if reason.is_forced() {
                    Notification::warning(format!("Signed out: {}", reason))
                } else {
                    Notification::info("Signed out")
                };
                self.notifications.push(notification);
                self.redirect_to_login();
            }
        }
    }

    fn redirect_to_login(&mut self) {
        self.state.current_screen = Screen::Login;
        self.state.clear_messages();
        self.state.reset_login();
    }

    /// Handle key press events
    pub fn handle_key(&mut self, key: KeyCode) {
        // The modal captures all input while it shows.
        if self.timeout.modal().visible {
            if let Some(action) = timeout_modal::action_for_key(key) {
                self.timeout.apply(action);
            }
            return;
        }

        match self.state.current_screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Help => self.handle_help_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.state.login_field = self.state.login_field.toggle();
            }
            KeyCode::Enter => match self.state.login_field {
                LoginField::Email if !self.state.email_input.is_empty() => {
                    self.state.login_field = LoginField::Password;
                }
                LoginField::Password => self.submit_login(),
                _ => {}
            },
            KeyCode::Backspace => self.state.pop_char(),
            KeyCode::Char(c) => self.state.push_char(c),
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.menu_index = self.state.menu_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state.menu_index < MENU_ITEMS.len() - 1 {
                    self.state.menu_index += 1;
                }
            }
            KeyCode::Enter => self.open_selected_section(),
            KeyCode::Char('r') => {
                if let Some(section) = self.state.last_section {
                    self.load_section(section);
                }
            }
            KeyCode::Char('t') => self.refresh_token(),
            KeyCode::Char('o') => {
                self.store.logout(LogoutReason::UserRequested);
            }
            KeyCode::Char('?') => self.state.current_screen = Screen::Help,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
            self.state.current_screen = if self.store.is_active() {
                Screen::Dashboard
            } else {
                Screen::Login
            };
        }
    }

    fn submit_login(&mut self) {
        let email = self.state.email_input.clone();
        let result = self
            .store
            .login_with(self.directory.as_ref(), &email, &self.state.password_input);
        self.state.reset_login();

        match result {
            Ok(()) => {
                self.persist_session();
                self.state.clear_messages();
                self.state.current_screen = Screen::Dashboard;
                let name = self
                    .store
                    .credentials()
                    .map(|c| c.user.display_name().to_string())
                    .unwrap_or_default();
                self.notifications
                    .push(Notification::success(format!("Welcome, {}", name)));
            }
            Err(e) => {
                self.state.error_message = Some(e.to_string());
            }
        }
    }

    fn persist_session(&self) {
        let (Some(file), Some(snapshot)) = (&self.session_file, self.store.snapshot()) else {
            return;
        };
        if let Err(e) = file.save(&snapshot) {
            warn!("Failed to persist session: {}", e);
        }
    }

    fn open_selected_section(&mut self) {
        let (title, path) = MENU_ITEMS[self.state.menu_index];
        if path.is_empty() {
            self.state.current_screen = Screen::Help;
            return;
        }
        self.state.last_section = Some(title);
        self.load_section(title);
    }

    /// Issue an authenticated request for a dashboard section
    fn load_section(&mut self, title: &'static str) {
        let Some((_, path)) = MENU_ITEMS.iter().find(|(t, _)| *t == title) else {
            return;
        };
        let mut request = OutgoingRequest::new("GET", *path);
        if self.interceptor.intercept(&mut request) {
            self.state.status_message = Some(format!("Loaded {}", title));
        }
    }

    fn refresh_token(&mut self) {
        match self.store.refresh_access_token(self.directory.as_ref()) {
            Some(_) => {
                self.persist_session();
                self.notifications
                    .push(Notification::success("Access token refreshed"));
            }
            None if self.store.is_active() => {
                self.notifications
                    .push(Notification::error("No refresh token for this session"));
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use agrireg_session::{SessionConfig, SessionPhase};
    use rstest::rstest;
    use std::time::Duration;
    use tempfile::tempdir;

    const PASSWORD: &str = "harvest-2024";

    fn config() -> ConsoleConfig {
        ConsoleConfig {
            session: SessionConfig::testing(),
            accounts: vec![AccountConfig {
                id: None,
                email: "officer@agri.example".into(),
                name: Some("Field Officer".into()),
                password_hash: hash_password(PASSWORD).unwrap(),
                roles: vec!["operator".into()],
            }],
            persist_session: true,
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    fn log_in(app: &mut App) {
        type_text(app, "officer@agri.example");
        app.handle_key(KeyCode::Enter);
        type_text(app, PASSWORD);
        app.handle_key(KeyCode::Enter);
    }

    #[tokio::test]
    async fn test_login_reaches_dashboard() {
        let mut app = App::new(config(), None).unwrap();
        log_in(&mut app);

        assert_eq!(app.state.current_screen, Screen::Dashboard);
        assert!(app.store.is_active());
        assert!(app.state.password_input.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_stays_on_login() {
        let mut app = App::new(config(), None).unwrap();
        type_text(&mut app, "officer@agri.example");
        app.handle_key(KeyCode::Enter);
        type_text(&mut app, "not-the-password");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.state.current_screen, Screen::Login);
        assert!(app.state.error_message.is_some());
        assert!(!app.store.is_active());
    }

    #[tokio::test]
    async fn test_invalid_thresholds_fail_fast() {
        let mut bad = config();
        bad.session.warning_threshold_ms = bad.session.hard_threshold_ms;
        assert!(App::new(bad, None).is_err());
    }

    #[tokio::test]
    async fn test_opening_section_records_activity() {
        let mut app = App::new(config(), None).unwrap();
        log_in(&mut app);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.state.last_section, Some("Operators"));
        assert_eq!(app.state.status_message.as_deref(), Some("Loaded Operators"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_captures_keys_and_extends() {
        let mut app = App::new(config(), None).unwrap();
        log_in(&mut app);

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert!(app.timeout.modal().visible);

        // Menu navigation is swallowed while the modal shows.
        app.handle_key(KeyCode::Down);
        assert_eq!(app.state.menu_index, 0);

        app.handle_key(KeyCode::Char('e'));
        assert_eq!(app.store.phase(), SessionPhase::ActiveFresh);
        assert!(!app.timeout.modal().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_logout_redirects_with_notice() {
        let mut app = App::new(config(), None).unwrap();
        log_in(&mut app);

        tokio::time::sleep(Duration::from_millis(4_100)).await;
        let event = app.events.recv().await.unwrap();
        assert!(matches!(event, AppEvent::SessionEnded(reason) if reason.is_forced()));

        app.on_event(event);
        assert_eq!(app.state.current_screen, Screen::Login);
        assert_eq!(app.state.login_field, LoginField::Password);
    }

    #[rstest]
    #[case(KeyCode::Char('o'))]
    #[case(KeyCode::Char('q'))]
    #[tokio::test]
    async fn test_dashboard_exit_keys(#[case] key: KeyCode) {
        let mut app = App::new(config(), None).unwrap();
        log_in(&mut app);
        app.handle_key(key);

        match key {
            KeyCode::Char('o') => assert!(!app.store.is_active()),
            _ => assert!(app.should_quit),
        }
    }

    #[tokio::test]
    async fn test_session_persisted_and_cleared() {
        let dir = tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));

        let mut app = App::new(config(), Some(file.clone())).unwrap();
        log_in(&mut app);
        assert!(file.load().unwrap().is_some());

        let restored = App::new(config(), Some(file.clone())).unwrap();
        assert_eq!(restored.state.current_screen, Screen::Dashboard);
        assert!(restored.store.is_active());

        app.handle_key(KeyCode::Char('o'));
        assert!(file.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_cleared() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let app = App::new(config(), Some(SessionFile::new(&path))).unwrap();
        assert_eq!(app.state.current_screen, Screen::Login);
        assert!(!app.store.is_active());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_refresh_without_token_warns() {
        let mut app = App::new(config(), None).unwrap();
        app.store.restore(agrireg_session::PersistedSession {
            token: "restored".into(),
            refresh_token: None,
            user: agrireg_session::UserProfile {
                email: "officer@agri.example".into(),
                ..Default::default()
            },
            roles: vec!["operator".into()],
            role: None,
        });
        app.state.current_screen = Screen::Dashboard;

        app.handle_key(KeyCode::Char('t'));
        assert!(app.store.is_active());
        assert!(!app.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_token_keeps_session() {
        let mut app = App::new(config(), None).unwrap();
        log_in(&mut app);
        let before = app.store.access_token();

        app.handle_key(KeyCode::Char('t'));
        assert!(app.store.is_active());
        assert_ne!(app.store.access_token(), before);
    }
}
