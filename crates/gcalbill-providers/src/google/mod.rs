//! Google Calendar provider.
//!
//! # Authentication
//!
//! 1. Client credentials are read from the Cloud Console JSON file
//! 2. A stored token is reused, or refreshed when expired
//! 3. Without a usable token, a PKCE loopback flow opens the browser
//! 4. New tokens are persisted for the next run
//!
//! # Example
//!
//! ```ignore
//! use gcalbill_providers::google::{GoogleConfig, GoogleProvider, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::from_file("credentials.json")?;
//! let mut provider = GoogleProvider::new(GoogleConfig::new(credentials))?;
//! provider.ensure_authenticated().await?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::GoogleCalendarClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow};
pub use provider::GoogleProvider;
pub use tokens::{TokenInfo, TokenStorage};
