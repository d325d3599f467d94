//! OAuth token persistence.
//!
//! The token is stored as pretty JSON with mode 0600 on Unix. Writes go
//! through a temporary file and a rename.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Seconds shaved off the reported lifetime so a token is refreshed before
/// Google rejects it.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An OAuth token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenInfo {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
            scopes,
        }
    }

    /// True once the access token is expired or about to be. Tokens
    /// without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Replaces the access token after a refresh. The refresh token is kept.
    pub fn refreshed(mut self, access_token: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.map(expiry_from_now);
        self
    }
}

fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS)
}

/// File-backed token store.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored token, `None` if the file does not exist.
    pub fn load(&self) -> ProviderResult<Option<TokenInfo>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no token file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to read token file: {}", e))
        })?;
        let token: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to parse token file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), "loaded token");
        Ok(Some(token))
    }

    /// Writes `token`, creating the parent directory if needed.
    pub fn save(&self, token: &TokenInfo) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!("failed to create token directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(token)
            .map_err(|e| ProviderError::internal(format!("failed to serialize token: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|e| {
            ProviderError::configuration(format!("failed to write token file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                ProviderError::configuration(format!("failed to restrict token file: {}", e))
            })?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to rename token file: {}", e))
        })?;

        info!(path = %self.path.display(), "saved token");
        Ok(())
    }

    /// Removes the token file if present.
    pub fn clear(&self) -> ProviderResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                ProviderError::configuration(format!("failed to remove token file: {}", e))
            })?;
            info!(path = %self.path.display(), "removed token");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

    #[test]
    fn new_token_is_fresh() {
        let token = TokenInfo::new("access", Some("refresh".into()), Some(3600), vec![]);
        assert!(!token.is_expired());
        assert!(token.expires_at.is_some());
    }

    #[test]
    fn expired_token() {
        let mut token = TokenInfo::new("access", None, Some(3600), vec![]);
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(token.is_expired());

        let refreshed = token.refreshed("new-access", Some(3600));
        assert!(!refreshed.is_expired());
        assert_eq!(refreshed.access_token, "new-access");
    }

    #[test]
    fn short_lifetime_is_already_expired() {
        let token = TokenInfo::new("access", None, Some(30), vec![]);
        assert!(token.is_expired());
    }

    #[test]
    fn scope_check() {
        let token = TokenInfo::new("access", None, None, vec![SCOPE.to_string()]);
        assert!(token.has_scopes(&[SCOPE.to_string()]));
        assert!(!token.has_scopes(&["other".to_string()]));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("nested").join("token.json"));
        let token = TokenInfo::new("access", Some("refresh".into()), Some(3600), vec![SCOPE.into()]);

        storage.save(&token).unwrap();
        assert_eq!(storage.load().unwrap(), Some(token));
        assert!(!dir.path().join("nested").join("token.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));
        storage
            .save(&TokenInfo::new("access", None, None, vec![]))
            .unwrap();
        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{not json").unwrap();
        assert!(TokenStorage::new(path).load().is_err());
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));
        storage
            .save(&TokenInfo::new("access", None, None, vec![]))
            .unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }
}
