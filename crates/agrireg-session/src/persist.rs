//! Session persistence across restarts
//!
//! Only credentials survive a restart. The activity timestamp and the warning
//! flag are never written, so a restored session starts fresh.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{Credentials, UserProfile};
use crate::error::Result;

/// On-disk form of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: UserProfile,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl From<&Credentials> for PersistedSession {
    fn from(credentials: &Credentials) -> Self {
        Self {
            token: credentials.access_token.clone(),
            refresh_token: credentials.refresh_token.clone(),
            user: credentials.user.clone(),
            roles: credentials.roles.clone(),
            role: credentials.role.clone(),
        }
    }
}

/// JSON file holding a [`PersistedSession`]
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session, `None` if there is none
    pub fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write the session, readable only by the owner on Unix
    pub fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        debug!("Saved session to {:?}", self.path);
        Ok(())
    }

    /// Remove the file; succeeds if it is already gone
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cleared session file {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> PersistedSession {
        PersistedSession {
            token: "tok".into(),
            refresh_token: Some("ref".into()),
            user: UserProfile {
                id: Some("42".into()),
                email: "officer@agri.example".into(),
                name: Some("Field Officer".into()),
                roles: vec!["operator".into()],
            },
            roles: vec!["OPERATOR".into()],
            role: Some("OPERATOR".into()),
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("nested").join("session.json"));
        file.save(&sample()).unwrap();

        assert_eq!(file.load().unwrap(), Some(sample()));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        file.save(&sample()).unwrap();

        file.clear().unwrap();
        file.clear().unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        assert!(SessionFile::new(path).load().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        file.save(&sample()).unwrap();

        let mode = fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
