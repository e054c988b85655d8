//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Serves both place lookup (`/search`) and reverse geocoding (`/reverse`).
//! Rate limit: 1 request per second, and a User-Agent is mandatory.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{Coordinates, PlaceLookup, PlaceResult, Placemark, ReverseGeocoder};
use serde::Deserialize;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
    limit: usize,
}

/// Nominatim place (jsonv2 with addressdetails)
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: NominatimAddress,
}

/// Reverse endpoint answers 200 with `{"error": ...}` when nothing is there
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Failure { error: String },
    Place(NominatimPlace),
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
    country: Option<String>,
    postcode: Option<String>,
}

impl NominatimAddress {
    fn locality(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
            .or_else(|| self.hamlet.clone())
    }
}

impl NominatimPlace {
    fn name(&self) -> Option<String> {
        self.name.clone().filter(|n| !n.is_empty())
    }

    fn into_placemark(self) -> Placemark {
        Placemark {
            name: self.name(),
            locality: self.address.locality(),
            administrative_area: self.address.state,
            country: self.address.country,
            thoroughfare: self.address.road,
            postal_code: self.address.postcode,
        }
    }

    fn into_place_result(self) -> Result<PlaceResult> {
        let coordinates = NominatimBackend::parse_coords(&self.lat, &self.lon)?;
        Ok(PlaceResult {
            name: self.name(),
            locality: self.address.locality(),
            coordinates,
        })
    }
}

impl NominatimBackend {
    /// Create a backend against `base_url`
    pub fn new(base_url: &str, user_agent: &str, limit: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
        })
    }

    /// Create a backend from the `[providers]` and `[search]` config sections
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.providers.nominatim_url,
            &config.providers.user_agent,
            config.search.limit,
        )
    }

    /// Parse lat/lng strings
    fn parse_coords(lat: &str, lng: &str) -> Result<Coordinates> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Lookup(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Lookup(format!("Invalid longitude: {}", lng)))?;
        Ok(Coordinates::new(lat, lng))
    }
}

impl PlaceLookup for NominatimBackend {
    async fn search(&self, query: &str) -> Result<Vec<PlaceResult>> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&addressdetails=1&limit={}",
            self.base_url,
            urlencoding::encode(query),
            self.limit
        );
        debug!(query, "nominatim search");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Lookup(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| Error::Lookup(format!("Failed to parse Nominatim response: {}", e)))?;

        // A hit with unusable coordinates is dropped, the rest are kept
        let places: Vec<PlaceResult> = places
            .into_iter()
            .filter_map(|place| match place.into_place_result() {
                Ok(result) => Some(result),
                Err(e) => {
                    debug!(query, "skipping search hit: {}", e);
                    None
                }
            })
            .collect();

        Ok(places)
    }
}

impl ReverseGeocoder for NominatimBackend {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<Placemark>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=jsonv2&addressdetails=1",
            self.base_url, coords.lat, coords.lng
        );
        debug!(%coords, "nominatim reverse");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(Vec::new());
            }
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let result: ReverseResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        match result {
            ReverseResponse::Failure { error } => {
                debug!(%coords, %error, "nominatim found nothing");
                Ok(Vec::new())
            }
            ReverseResponse::Place(place) => Ok(vec![place.into_placemark()]),
        }
    }
}
