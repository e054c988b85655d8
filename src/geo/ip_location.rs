//! IP-based device location
//!
//! Uses ip-api.com as a best-effort stand-in for a GPS fix. Access starts
//! undetermined and is settled by `location.allow_current_location` the first
//! time it is requested.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{Coordinates, LocationAuthorization, LocationProvider};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// IP location service
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
    allowed: bool,
    requested: AtomicBool,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl IpLocator {
    /// Create a locator against `url`
    pub fn new(url: &str, user_agent: &str, allowed: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            allowed,
            requested: AtomicBool::new(false),
        })
    }

    /// Create a locator from the `[providers]` and `[location]` config sections
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.providers.ip_api_url,
            &config.providers.user_agent,
            config.location.allow_current_location,
        )
    }

    /// Fetch location from ip-api.com
    async fn fetch_location(&self) -> Result<Coordinates> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Location(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Location(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Location(format!("Failed to parse IP location response: {}", e)))?;

        if data.status != "success" {
            return Err(Error::Location(format!(
                "IP location lookup failed: {}",
                data.message.unwrap_or(data.status)
            )));
        }

        let lat = data
            .lat
            .ok_or_else(|| Error::Location("No latitude in response".to_string()))?;
        let lng = data
            .lon
            .ok_or_else(|| Error::Location("No longitude in response".to_string()))?;

        let coords = Coordinates::new(lat, lng);
        coords.validate()?;
        debug!(%coords, "ip location fix");
        Ok(coords)
    }
}

impl LocationProvider for IpLocator {
    fn authorization(&self) -> LocationAuthorization {
        if !self.requested.load(Ordering::Acquire) {
            LocationAuthorization::NotDetermined
        } else if self.allowed {
            LocationAuthorization::WhenInUse
        } else {
            LocationAuthorization::Denied
        }
    }

    async fn request_when_in_use_authorization(&self) -> LocationAuthorization {
        self.requested.store(true, Ordering::Release);
        self.authorization()
    }

    async fn current_location(&self) -> Result<Coordinates> {
        if !self.authorization().is_granted() {
            return Err(Error::PermissionDenied);
        }
        self.fetch_location().await
    }
}
