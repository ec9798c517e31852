//! Account directory with Argon2 password hashes

use std::collections::HashMap;
use std::sync::Mutex;

use agrireg_session::{normalize_email, AuthError, Authenticator, LoginResponse, UserProfile};
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::app::AccountConfig;

/// Minimum password length accepted by `hash-password`
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password for the `accounts` section of the config
pub fn hash_password(password: &str) -> Result<String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        anyhow::bail!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        );
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_bytes = Zeroizing::new(password.as_bytes().to_vec());
    let hash = Argon2::default()
        .hash_password(&password_bytes, &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Local authenticator backed by configured accounts
///
/// Issues random access and refresh tokens. Refresh tokens are only known for
/// the lifetime of the process.
pub struct AccountDirectory {
    accounts: Vec<AccountConfig>,
    /// Refresh token -> account email
    refresh_tokens: Mutex<HashMap<String, String>>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<AccountConfig>) -> Self {
        Self {
            accounts,
            refresh_tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn find(&self, email: &str) -> Option<&AccountConfig> {
        let email = normalize_email(email);
        self.accounts
            .iter()
            .find(|a| normalize_email(&a.email) == email)
    }

    fn verify(account: &AccountConfig, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&account.password_hash) else {
            tracing::warn!(user = %account.email, "Unparseable password hash in config");
            return false;
        };
        let password = Zeroizing::new(password.as_bytes().to_vec());
        Argon2::default().verify_password(&password, &parsed).is_ok()
    }
}

impl Authenticator for AccountDirectory {
    fn login(&self, email: &str, password: &str) -> std::result::Result<LoginResponse, AuthError> {
        let account = self.find(email).ok_or(AuthError::InvalidCredentials)?;
        if !Self::verify(account, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let refresh_token = Uuid::new_v4().to_string();
        self.refresh_tokens
            .lock()
            .map_err(|_| AuthError::Unavailable("token table poisoned".into()))?
            .insert(refresh_token.clone(), account.email.clone());

        Ok(LoginResponse {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Some(refresh_token),
            user: UserProfile {
                id: account.id.clone(),
                email: normalize_email(&account.email),
                name: account.name.clone(),
                roles: account.roles.clone(),
            },
        })
    }

    fn refresh(&self, refresh_token: &str) -> std::result::Result<String, AuthError> {
        let tokens = self
            .refresh_tokens
            .lock()
            .map_err(|_| AuthError::Unavailable("token table poisoned".into()))?;
        if tokens.contains_key(refresh_token) {
            Ok(Uuid::new_v4().to_string())
        } else {
            Err(AuthError::RefreshRejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> AccountDirectory {
        AccountDirectory::new(vec![AccountConfig {
            id: Some("7".into()),
            email: "Officer@Agri.Example".into(),
            name: Some("Field Officer".into()),
            password_hash: hash_password("harvest-2024").unwrap(),
            roles: vec!["operator".into()],
        }])
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(hash_password("short").is_err());
    }

    #[test]
    fn test_login_normalizes_email() {
        let dir = directory();
        let response = dir.login("  officer@agri.example ", "harvest-2024").unwrap();
        assert_eq!(response.user.email, "officer@agri.example");
        assert_eq!(response.user.roles, vec!["operator"]);
        assert!(response.refresh_token.is_some());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let dir = directory();
        assert_eq!(
            dir.login("officer@agri.example", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            dir.login("nobody@agri.example", "harvest-2024"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_refresh_only_for_issued_tokens() {
        let dir = directory();
        let response = dir.login("officer@agri.example", "harvest-2024").unwrap();
        let refresh = response.refresh_token.unwrap();

        let token = dir.refresh(&refresh).unwrap();
        assert_ne!(token, response.access_token);
        assert_eq!(dir.refresh("forged"), Err(AuthError::RefreshRejected));
    }

    #[test]
    fn test_bad_hash_never_verifies() {
        let dir = AccountDirectory::new(vec![AccountConfig {
            id: None,
            email: "a@agri.example".into(),
            name: None,
            password_hash: "not-a-phc-string".into(),
            roles: vec![],
        }]);
        assert!(dir.login("a@agri.example", "anything-at-all").is_err());
    }
}
