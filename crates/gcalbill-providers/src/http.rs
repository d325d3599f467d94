//! Shared HTTP client construction and response checks.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{ProviderError, ProviderResult};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("gcalbill/", env!("CARGO_PKG_VERSION"));

/// Builds a client with a per-request timeout.
pub fn build_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {}", e)))
}

/// Maps a non-success status to the matching provider error.
pub fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body.trim())
    };
    match status {
        StatusCode::UNAUTHORIZED => {
            ProviderError::authentication(format!("access token expired or invalid ({})", detail))
        }
        StatusCode::FORBIDDEN => ProviderError::authorization(format!("access denied ({})", detail)),
        StatusCode::NOT_FOUND => ProviderError::not_found(detail),
        StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::rate_limited(format!("rate limit exceeded ({})", detail))
        }
        StatusCode::BAD_REQUEST => ProviderError::bad_request(detail),
        s if s.is_server_error() => ProviderError::server(format!("server error ({})", detail)),
        _ => ProviderError::invalid_response(format!("unexpected status ({})", detail)),
    }
}

/// Reads the body of `response`, failing on any non-success status.
pub async fn read_success_body(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    Ok(body)
}
