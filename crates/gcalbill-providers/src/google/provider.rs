//! [`CalendarProvider`] implementation for Google Calendar.

use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarInfo, CalendarProvider, EventPage, EventQuery};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::tokens::{TokenInfo, TokenStorage};

/// Google Calendar backend.
///
/// Authentication happens once, up front, through
/// [`ensure_authenticated`](Self::ensure_authenticated). The listing calls
/// fail with an authentication error until it has succeeded.
#[derive(Debug)]
pub struct GoogleProvider {
    config: GoogleConfig,
    token_storage: TokenStorage,
    oauth_client: OAuthClient,
    api_client: Option<GoogleCalendarClient>,
}

impl GoogleProvider {
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate()?;
        let token_storage = TokenStorage::new(&config.token_path);
        let oauth_client = OAuthClient::new(config.credentials.clone(), config.request_timeout)?;

        Ok(Self {
            config,
            token_storage,
            oauth_client,
            api_client: None,
        })
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_client.is_some()
    }

    /// Obtains a usable access token.
    ///
    /// Uses the stored token when it is fresh and carries the configured
    /// scopes, refreshes it when expired, and otherwise runs the interactive
    /// browser flow. Any new token is persisted.
    pub async fn ensure_authenticated(&mut self) -> ProviderResult<()> {
        if self.api_client.is_some() {
            return Ok(());
        }

        let token = match self.token_storage.load()? {
            Some(token) if !token.has_scopes(&self.config.scopes) => {
                info!("stored token lacks required scopes, re-authorizing");
                self.authorize().await?
            }
            Some(token) if token.is_expired() => self.refresh(token).await?,
            Some(token) => {
                debug!("using stored token");
                token
            }
            None => self.authorize().await?,
        };

        self.api_client = Some(GoogleCalendarClient::new(
            &token.access_token,
            self.config.request_timeout,
        )?);
        Ok(())
    }

    /// Discards the stored token and runs the browser flow again.
    pub async fn reauthenticate(&mut self) -> ProviderResult<()> {
        self.token_storage.clear()?;
        self.api_client = None;
        self.ensure_authenticated().await
    }

    pub fn token_path(&self) -> &std::path::Path {
        self.token_storage.path()
    }

    async fn refresh(&self, token: TokenInfo) -> ProviderResult<TokenInfo> {
        let Some(refresh_token) = token.refresh_token.clone() else {
            info!("stored token expired without refresh token, re-authorizing");
            return self.authorize().await;
        };

        debug!("refreshing expired access token");
        let (access_token, expires_in) = self.oauth_client.refresh_token(&refresh_token).await?;
        let token = token.refreshed(access_token, expires_in);
        self.token_storage.save(&token)?;
        Ok(token)
    }

    async fn authorize(&self) -> ProviderResult<TokenInfo> {
        let token = self
            .oauth_client
            .authorize(
                &self.config.scopes,
                self.config.loopback_port_range,
                self.config.callback_timeout,
            )
            .await?;
        self.token_storage.save(&token)?;
        info!("authorization successful");
        Ok(token)
    }

    fn client(&self) -> ProviderResult<&GoogleCalendarClient> {
        self.api_client
            .as_ref()
            .ok_or_else(|| ProviderError::authentication("not authenticated").with_provider("google"))
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            self.client()?
                .list_calendars()
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }

    fn list_events_page<'a>(
        &'a self,
        query: &'a EventQuery,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<EventPage>> {
        Box::pin(async move {
            self.client()?
                .list_events_page(query, page_token)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::google::config::OAuthCredentials;
    use chrono::{TimeZone, Utc};
    use gcalbill_core::TimeWindow;

    fn test_config(dir: &tempfile::TempDir) -> GoogleConfig {
        let credentials =
            OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret");
        GoogleConfig::new(credentials).with_token_path(dir.path().join("token.json"))
    }

    #[test]
    fn invalid_credentials_rejected() {
        let config = GoogleConfig::new(OAuthCredentials::new("bad", "secret"));
        let err = GoogleProvider::new(config).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn uses_fresh_stored_token_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        TokenStorage::new(&config.token_path)
            .save(&TokenInfo::new(
                "ya29.stored",
                Some("refresh".into()),
                Some(3600),
                config.scopes.clone(),
            ))
            .unwrap();

        let mut provider = GoogleProvider::new(config).unwrap();
        assert!(!provider.is_authenticated());
        provider.ensure_authenticated().await.unwrap();
        assert!(provider.is_authenticated());
    }

    #[tokio::test]
    async fn listing_requires_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let provider = GoogleProvider::new(test_config(&dir)).unwrap();
        let query = EventQuery::new(
            "primary",
            TimeWindow::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            ),
        );

        let err = provider.list_events_page(&query, None).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert_eq!(err.provider(), Some("google"));
    }
}
