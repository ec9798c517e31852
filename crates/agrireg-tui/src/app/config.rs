//! Console configuration persistence
//!
//! Loads session thresholds, operator accounts and the session persistence
//! preference from `config.json` in the AgriReg config directory.

use std::fs;
use std::path::{Path, PathBuf};

use agrireg_session::SessionConfig;
use serde::{Deserialize, Serialize};

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted session file name
const SESSION_FILE_NAME: &str = "session.json";

/// Log file name
const LOG_FILE_NAME: &str = "agrireg.log";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "agrireg";

/// Operator account allowed to sign in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountConfig {
    #[serde(default)]
    pub id: Option<String>,

    pub email: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Argon2 PHC string produced by `agrireg hash-password`
    pub password_hash: String,

    #[serde(default)]
    pub roles: Vec<String>,
}

/// Console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Idle thresholds
    #[serde(default)]
    pub session: SessionConfig,

    /// Accounts accepted at the login screen
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Keep the session across restarts
    #[serde(default = "default_persist_session")]
    pub persist_session: bool,
}

fn default_persist_session() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            accounts: Vec::new(),
            persist_session: default_persist_session(),
        }
    }
}

impl ConsoleConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        // Try XDG_CONFIG_HOME first, then fall back to ~/.config
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Where the persisted session lives
    pub fn session_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(SESSION_FILE_NAME))
    }

    /// Where tracing output goes while the terminal is in raw mode
    pub fn log_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(LOG_FILE_NAME))
    }

    /// Load configuration from `path`
    ///
    /// Returns default configuration if the file doesn't exist or can't be parsed.
    pub fn load_from(path: &Path) -> Self {
        Self::load_strict(path).unwrap_or_else(|e| {
            tracing::warn!("Using default config: {}", e);
            Self::default()
        })
    }

    /// Load configuration from `path`, failing on unreadable or malformed files
    ///
    /// A missing file yields the default configuration.
    pub fn load_strict(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save configuration to `path`, readable only by the owner on Unix
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        // The file carries password hashes.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Add or replace an account in the config file at `path`
    ///
    /// Refuses to touch a file that exists but does not parse.
    pub fn add_account_to(path: &Path, account: AccountConfig) -> Result<(), ConfigError> {
        let mut config = Self::load_strict(path)?;
        config.accounts.retain(|a| a.email != account.email);
        config.accounts.push(account);
        config.save_to(path)
    }

    /// Replace thresholds given on the command line
    pub fn with_overrides(
        mut self,
        warning_secs: Option<u64>,
        hard_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(secs) = warning_secs {
            self.session.warning_threshold_ms = secs_to_ms(secs)?;
        }
        if let Some(secs) = hard_secs {
            self.session.hard_threshold_ms = secs_to_ms(secs)?;
        }
        Ok(self)
    }
}

fn secs_to_ms(secs: u64) -> Result<u64, ConfigError> {
    secs.checked_mul(1000)
        .ok_or(ConfigError::ThresholdTooLarge(secs))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Threshold of {0} seconds is too large")]
    ThresholdTooLarge(u64),
}
