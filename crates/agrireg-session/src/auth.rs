//! Credentials and the authentication collaborator

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication failures reported by an [`Authenticator`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Refresh token rejected")]
    RefreshRejected,

    #[error("Authentication backend unavailable: {0}")]
    Unavailable(String),
}

/// Registry user as returned by the login endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserProfile {
    /// Name to show in headers, falling back to the email address
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Successful login payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: UserProfile,
}

/// Everything the store holds while a session is active
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: UserProfile,
    /// Upper-cased roles
    pub roles: Vec<String>,
    /// First role, if any
    pub role: Option<String>,
}

impl From<LoginResponse> for Credentials {
    fn from(response: LoginResponse) -> Self {
        let roles = normalize_roles(&response.user.roles);
        let role = roles.first().cloned();
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            user: response.user,
            roles,
            role,
        }
    }
}

/// Backend that issues and refreshes access tokens
pub trait Authenticator: Send + Sync {
    /// Exchange an email and password for tokens
    fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError>;

    /// Exchange a refresh token for a new access token
    fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;
}

/// Upper-case role names so they match backend role checks
pub fn normalize_roles(roles: &[String]) -> Vec<String> {
    roles.iter().map(|r| r.trim().to_uppercase()).collect()
}

/// Trim and lower-case an email before it is sent to the backend
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
