//! Country geolocation through ifconfig.co.

use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::http::read_success_body;
use crate::provider::BoxFuture;

use super::Geolocator;

/// JSON geolocation endpoint.
pub const IFCONFIG_URL: &str = "https://ifconfig.co/json";

#[derive(Debug, Deserialize)]
struct IfconfigResponse {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    country_iso: String,
}

/// Geolocates the caller's public IP with ifconfig.co.
#[derive(Debug, Clone)]
pub struct IfconfigGeolocator {
    http: reqwest::Client,
}

impl IfconfigGeolocator {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn lookup(&self) -> ProviderResult<String> {
        let response = self
            .http
            .get(IFCONFIG_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let body = read_success_body(response).await?;
        parse_country(&body)
    }
}

impl Geolocator for IfconfigGeolocator {
    fn country_code(&self) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move {
            self.lookup()
                .await
                .map_err(|e| e.with_provider("ifconfig"))
        })
    }
}

/// Extracts the ISO country code from an ifconfig.co JSON body.
fn parse_country(body: &str) -> ProviderResult<String> {
    let response: IfconfigResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("invalid geolocation response: {}", e))
    })?;
    let code = response.country_iso.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(ProviderError::invalid_response(
            "geolocation response has no country code",
        ));
    }
    debug!(ip = %response.ip, country = %response.country, %code, "geolocated caller");
    Ok(code)
}
