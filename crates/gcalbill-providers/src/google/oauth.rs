//! OAuth 2.0 authorization code flow with PKCE for Google APIs.
//!
//! A desktop client cannot keep a secret, so the flow uses a loopback
//! redirect:
//!
//! 1. Generate a code verifier, its SHA-256 challenge and a random state
//! 2. Bind a local HTTP listener on the first free port of a range
//! 3. Open the browser on Google's consent page
//! 4. Read `code` and `state` from the redirect
//! 5. Exchange the code (with the verifier) for tokens

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::http::build_client;

use super::config::OAuthCredentials;
use super::tokens::TokenInfo;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Verifier entropy in bytes, before base64 encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

/// Token endpoint client and interactive authorization.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
    token_url: String,
}

impl OAuthClient {
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            credentials,
            http_client: build_client(timeout)?,
            token_url: GOOGLE_TOKEN_URL.to_string(),
        })
    }

    /// Runs the interactive flow and returns the granted tokens.
    ///
    /// # Errors
    ///
    /// Fails if no loopback port is free, the user denies access, the state
    /// does not match, the redirect does not arrive within
    /// `callback_timeout`, or the code exchange is rejected.
    pub async fn authorize(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
        callback_timeout: Duration,
    ) -> ProviderResult<TokenInfo> {
        let pkce = PkceFlow::new();
        let (listener, port) = bind_loopback_server(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, scopes);

        info!("opening browser for Google authorization");
        debug!(url = %auth_url, "authorization URL");
        if let Err(e) = open::that(&auth_url) {
            warn!(error = %e, "failed to open browser");
            eprintln!("\nGo to the following link in your browser:\n\n{}\n", auth_url);
        }

        let (code, received_state) = wait_for_callback(listener, callback_timeout).await?;
        if received_state != pkce.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch, authorization aborted",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        let response = self
            .token_request(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", code.as_str()),
                ("code_verifier", pkce.verifier.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .await?;

        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            scopes.to_vec(),
        ))
    }

    /// Exchanges a refresh token for a new access token and its lifetime.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<(String, Option<i64>)> {
        let response = self
            .token_request(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        info!("refreshed access token");
        Ok((response.access_token, response.expires_in))
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token request failed ({}): {}",
                status,
                body.trim()
            )));
        }
        parse_token_response(&body)
    }
}

fn parse_token_response(body: &str) -> ProviderResult<TokenResponse> {
    serde_json::from_str(body)
        .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))
}

/// Binds the first free port of `port_range` on 127.0.0.1.
fn bind_loopback_server(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!(port, "bound loopback server");
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no available port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// Waits for the browser redirect on a helper thread.
async fn wait_for_callback(
    listener: TcpListener,
    timeout: Duration,
) -> ProviderResult<(String, String)> {
    let (tx, rx) = oneshot::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => debug!(error = %e, "failed to accept callback connection"),
            }
        }
    });

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(ProviderError::internal("callback listener stopped")),
        Err(_) => Err(ProviderError::timeout(format!(
            "no authorization callback within {}s",
            timeout.as_secs()
        ))),
    }
}

/// Answers one request on the loopback server.
///
/// Returns `None` for requests that are not the OAuth redirect (favicon
/// and the like) so the listener keeps waiting.
fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<(String, String)>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    let result = parse_callback_request(&request_line)?;
    let page = match result {
        Ok(_) => {
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
             <html><body><h1>Authorization successful</h1>\
             <p>You can close this window and return to the terminal.</p></body></html>"
        }
        Err(_) => {
            "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
             <html><body><h1>Authorization failed</h1>\
             <p>You can close this window.</p></body></html>"
        }
    };
    let _ = stream.write_all(page.as_bytes());
    let _ = stream.flush();
    Some(result)
}

/// Extracts `(code, state)` from a `GET /callback?...` request line.
fn parse_callback_request(request_line: &str) -> Option<ProviderResult<(String, String)>> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path != "/callback" {
        return None;
    }

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Some(Err(ProviderError::authentication(format!(
            "authorization denied: {}",
            error
        ))));
    }
    Some(match code {
        Some(code) => Ok((code, state.unwrap_or_default())),
        None => Err(ProviderError::authentication(
            "missing authorization code in callback",
        )),
    })
}

/// PKCE parameters for one authorization attempt (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    pub verifier: String,
    /// Base64url SHA-256 of the verifier.
    pub challenge: String,
    /// CSRF token echoed back by the redirect.
    pub state: String,
}

impl PkceFlow {
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    /// Builds the consent page URL.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        let scope = scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
             code_challenge={}&code_challenge_method=S256&state={}&\
             access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn compute_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}
