//! Error types for clinic-locator

use thiserror::Error;

/// Main error type for clinic-locator operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location error: {0}")]
    Location(String),

    #[error("Place lookup error: {0}")]
    Lookup(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("No placemark found at {lat}, {lng}")]
    NoPlacemark { lat: f64, lng: f64 },

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for clinic-locator operations
pub type Result<T> = std::result::Result<T, Error>;
