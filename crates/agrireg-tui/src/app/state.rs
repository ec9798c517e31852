//! Application state

use zeroize::Zeroizing;

/// Current screen/view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Email and password prompt
    #[default]
    Login,

    /// Main dashboard with menu
    Dashboard,

    /// Help screen
    Help,
}

/// Focused input on the login screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    pub fn toggle(self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        }
    }
}

/// Registry sections reachable from the dashboard
pub const MENU_ITEMS: [(&str, &str); 6] = [
    ("Farmers", "/farmers"),
    ("Operators", "/operators"),
    ("ID Cards", "/id-cards"),
    ("Reports", "/reports"),
    ("Activity Logs", "/logs"),
    ("Help", ""),
];

/// Maximum characters accepted in a login field
pub const MAX_INPUT_LENGTH: usize = 64;

/// Application state
#[derive(Default)]
pub struct AppState {
    /// Current screen
    pub current_screen: Screen,

    /// Login form: email buffer
    pub email_input: String,

    /// Login form: password buffer
    pub password_input: Zeroizing<String>,

    /// Login form: focused field
    pub login_field: LoginField,

    /// Dashboard menu selection index
    pub menu_index: usize,

    /// Last section loaded from the dashboard
    pub last_section: Option<&'static str>,

    /// Status message to display
    pub status_message: Option<String>,

    /// Error message to display
    pub error_message: Option<String>,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a character to the focused login field
    pub fn push_char(&mut self, c: char) {
        let field = match self.login_field {
            LoginField::Email => &mut self.email_input,
            LoginField::Password => &mut *self.password_input,
        };
        if field.chars().count() < MAX_INPUT_LENGTH {
            field.push(c);
        }
    }

    /// Remove the last character of the focused login field
    pub fn pop_char(&mut self) {
        match self.login_field {
            LoginField::Email => {
                self.email_input.pop();
            }
            LoginField::Password => {
                self.password_input.pop();
            }
        }
    }

    /// Reset the login form, keeping the email for convenience
    pub fn reset_login(&mut self) {
        self.password_input = Zeroizing::new(String::new());
        self.login_field = if self.email_input.is_empty() {
            LoginField::Email
        } else {
            LoginField::Password
        };
    }

    /// Clear status messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut state = AppState::new();
        state.push_char('a');
        state.login_field = state.login_field.toggle();
        state.push_char('p');
        state.push_char('w');
        state.pop_char();

        assert_eq!(state.email_input, "a");
        assert_eq!(state.password_input.as_str(), "p");
    }

    #[test]
    fn test_input_length_capped() {
        let mut state = AppState::new();
        for _ in 0..(MAX_INPUT_LENGTH + 10) {
            state.push_char('x');
        }
        assert_eq!(state.email_input.len(), MAX_INPUT_LENGTH);
    }

    #[test]
    fn test_reset_login_focuses_password_when_email_known() {
        let mut state = AppState::new();
        state.email_input = "officer@agri.example".into();
        state.login_field = LoginField::Password;
        state.push_char('s');

        state.reset_login();
        assert!(state.password_input.is_empty());
        assert_eq!(state.login_field, LoginField::Password);
    }
}
