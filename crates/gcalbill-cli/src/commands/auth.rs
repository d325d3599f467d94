//! Authentication commands.

use tracing::info;

use gcalbill_providers::google::{GoogleConfig, GoogleProvider, OAuthCredentials};

use crate::config::ReportConfig;
use crate::error::ClientResult;

/// Provider settings from the resolved configuration.
///
/// Reads the Cloud Console credentials file; a missing or malformed file is
/// a configuration error.
pub fn google_config(config: &ReportConfig) -> ClientResult<GoogleConfig> {
    let credentials = OAuthCredentials::from_file(&config.credentials_file)?;
    let mut google = GoogleConfig::new(credentials);
    if let Some(ref path) = config.token_path {
        google = google.with_token_path(path);
    }
    google.validate()?;
    Ok(google)
}

/// Builds the Google provider and makes sure it holds a usable token.
///
/// May open a browser when no valid token is stored.
pub async fn connect(config: &ReportConfig) -> ClientResult<GoogleProvider> {
    let mut provider = GoogleProvider::new(google_config(config)?)?;
    provider.ensure_authenticated().await?;
    Ok(provider)
}

/// Run the Google authentication flow and store the token.
pub async fn run(config: &ReportConfig, force: bool) -> ClientResult<()> {
    let mut provider = GoogleProvider::new(google_config(config)?)?;

    if force {
        println!("Starting Google Calendar authentication...");
        println!("A browser window will open for you to authorize access.");
        provider.reauthenticate().await?;
    } else {
        provider.ensure_authenticated().await?;
    }

    info!(token = %provider.token_path().display(), "Google authentication ready");
    println!("Authenticated with Google Calendar.");
    println!("Token stored in {}", provider.token_path().display());
    Ok(())
}
