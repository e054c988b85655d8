//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, search};

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = search::DEBOUNCE_MS;

/// Default number of places per lookup
pub const DEFAULT_SEARCH_LIMIT: usize = search::RESULT_LIMIT;

/// Default Nominatim base URL
pub const DEFAULT_NOMINATIM_URL: &str = api::NOMINATIM_URL;

/// Default IP geolocation URL
pub const DEFAULT_IP_API_URL: &str = api::IP_API_URL;

/// Default User-Agent for provider requests
pub const DEFAULT_USER_AGENT: &str = api::USER_AGENT;

/// Default clinic registration endpoint
pub const DEFAULT_ENDPOINT: &str = api::CLINIC_ENDPOINT_URL;

/// Current location is allowed unless the user turns it off
pub const DEFAULT_ALLOW_CURRENT_LOCATION: bool = true;

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "clinic-locator";
