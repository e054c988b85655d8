//! Centralized constants for the clinic-locator crate
//!
//! Values shared by the config defaults and the provider clients.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Clinic registration endpoint
    pub const CLINIC_ENDPOINT_URL: &str =
        "https://sandbox.demo.sainahealth.com/api/HealthProviders/CreateHealthProvider";

    /// User-Agent sent to public providers (Nominatim rejects anonymous clients)
    pub const USER_AGENT: &str = concat!("clinic-locator/", env!("CARGO_PKG_VERSION"));
}

/// Search settings
pub mod search {
    /// Quiet window before a typed query is looked up
    pub const DEBOUNCE_MS: u64 = 500;

    /// Maximum number of places returned per lookup
    pub const RESULT_LIMIT: usize = 10;
}

/// Submission request headers
pub mod submission {
    pub const CONTENT_TYPE: &str = "application/json-patch+json";
    pub const ACCEPT: &str = "text/plain";
}
