//! clinic-locator: find a location and register it as a clinic
//!
//! A library and CLI tool for the "add your clinic" flow: search for a place,
//! drop a pin (search hit, current location or explicit coordinates),
//! reverse geocode it to a postal address and submit that address to the
//! registration endpoint.
//!
//! ## Features
//!
//! - Debounced place search with last-issued-wins results
//! - Reverse geocoding into a single, overwritten address slot
//! - Fire-and-forget registration POST
//! - Nominatim and IP geolocation providers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clinic_locator::geo::ip_location::IpLocator;
//! use clinic_locator::geo::nominatim::NominatimBackend;
//! use clinic_locator::resolver::{LocationEvents, LocationResolver};
//! use clinic_locator::submit::ClinicSubmitter;
//! use clinic_locator::{Config, Coordinates};
//!
//! # async fn run() -> clinic_locator::Result<()> {
//! let config = Config::default();
//! let resolver = LocationResolver::new(
//!     NominatimBackend::from_config(&config)?,
//!     IpLocator::from_config(&config)?,
//! );
//!
//! // The pin was dropped on downtown Austin
//! resolver.on_annotation_dragged(Coordinates::new(30.2672, -97.7431)).await;
//!
//! let submitter = ClinicSubmitter::from_config(&config)?;
//! submitter.submit_detached(resolver.payload().await);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod resolver;
pub mod search;
pub mod submit;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{Coordinates, PlaceResult, Placemark};
pub use resolver::{Address, LocationResolver, SubmissionPayload};
pub use search::SearchDebouncer;
pub use submit::{ClinicSubmitter, SubmissionOutcome};
