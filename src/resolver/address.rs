//! Resolved address and the registration payload built from it

use crate::geo::Placemark;
use serde::{Deserialize, Serialize};

/// Structured address resolved from a placemark
///
/// Fields the provider left out are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

impl Address {
    /// Map a reverse geocoding candidate onto the six address fields
    pub fn from_placemark(placemark: &Placemark) -> Self {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: field(&placemark.name),
            street_address: field(&placemark.thoroughfare),
            city: field(&placemark.locality),
            state: field(&placemark.administrative_area),
            country: field(&placemark.country),
            zip_code: field(&placemark.postal_code),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [
            &self.name,
            &self.street_address,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.country,
        ];
        let line = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}", line)
    }
}

/// Body of the clinic registration request
///
/// Serializes as a flat object with exactly the keys
/// `city, country, name, state, streetAddress, zipCode`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub city: String,
    pub country: String,
    pub name: String,
    pub state: String,
    pub street_address: String,
    pub zip_code: String,
}

impl From<&Address> for SubmissionPayload {
    fn from(address: &Address) -> Self {
        Self {
            city: address.city.clone(),
            country: address.country.clone(),
            name: address.name.clone(),
            state: address.state.clone(),
            street_address: address.street_address.clone(),
            zip_code: address.zip_code.clone(),
        }
    }
}
