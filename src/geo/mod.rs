//! Geographic primitives and location providers
//!
//! Provides place lookup (free text to candidate places), reverse geocoding
//! (coordinates to address candidates) and the device location capability.

pub mod ip_location;
pub mod nominatim;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// A place lookup hit, kept in provider order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub name: Option<String>,
    pub locality: Option<String>,
    pub coordinates: Coordinates,
}

/// A reverse geocoding candidate
///
/// Every field is optional; providers omit whatever they don't know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    pub name: Option<String>,
    pub locality: Option<String>,
    pub administrative_area: Option<String>,
    pub country: Option<String>,
    pub thoroughfare: Option<String>,
    pub postal_code: Option<String>,
}

/// Free-text place search
pub trait PlaceLookup: Send + Sync + 'static {
    /// Search for places matching `query`, in provider order
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<PlaceResult>>> + Send;
}

/// Coordinates to address candidates
pub trait ReverseGeocoder: Send + Sync + 'static {
    /// Returns zero or more candidates, best first
    fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> impl Future<Output = Result<Vec<Placemark>>> + Send;
}

/// Authorization state of the device location capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAuthorization {
    #[default]
    NotDetermined,
    Denied,
    WhenInUse,
    Always,
}

impl LocationAuthorization {
    /// Whether current location may be requested in this state
    pub fn is_granted(self) -> bool {
        matches!(self, Self::WhenInUse | Self::Always)
    }
}

/// Device location capability
pub trait LocationProvider: Send + Sync + 'static {
    /// Current authorization state
    fn authorization(&self) -> LocationAuthorization;

    /// Ask for when-in-use access, returning the resulting state
    fn request_when_in_use_authorization(
        &self,
    ) -> impl Future<Output = LocationAuthorization> + Send;

    /// Best-effort current position
    fn current_location(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}
