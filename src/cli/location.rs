//! Location selection shared by `resolve` and `submit`
//!
//! Drives the resolver the same way the picker screen does: a search hit is
//! selected, the current location is used, or the pin is dropped at explicit
//! coordinates.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::ip_location::IpLocator;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{Coordinates, LocationAuthorization, PlaceLookup, PlaceResult};
use crate::resolver::{Address, LocationEvents, LocationResolver};
use clap::Args;

/// Resolver wired to the configured providers
pub type Resolver = LocationResolver<NominatimBackend, IpLocator>;

/// Where to drop the pin
#[derive(Args, Debug)]
pub struct LocationArgs {
    /// Latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Place name (first search hit is used)
    #[arg(long, conflicts_with_all = ["lat", "lng", "here"])]
    pub place: Option<String>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lng", "place"])]
    pub here: bool,
}

/// Build a resolver from config
pub fn build_resolver(config: &Config) -> Result<(Resolver, NominatimBackend)> {
    let nominatim = NominatimBackend::from_config(config)?;
    let locator = IpLocator::from_config(config)?;
    Ok((LocationResolver::new(nominatim.clone(), locator), nominatim))
}

/// First hit for `query`, searched lower-cased like the search box does
async fn first_place<L: PlaceLookup>(lookup: &L, query: &str) -> Result<PlaceResult> {
    lookup
        .search(&query.to_lowercase())
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Lookup(format!("No places found for '{}'", query)))
}

/// Drop the pin according to `args` and return the resolved address
pub async fn pick(args: &LocationArgs, config: &Config) -> Result<(Resolver, Address)> {
    let (resolver, lookup) = build_resolver(config)?;

    if args.here {
        // Fresh process: access has not been asked for yet
        resolver
            .on_authorization_changed(LocationAuthorization::NotDetermined)
            .await;

        if resolver.snapshot().await.authorization == LocationAuthorization::Denied {
            return Err(Error::PermissionDenied);
        }
        if !resolver.use_current_location().await {
            return Err(Error::Location("Current location unavailable".to_string()));
        }
    } else if let Some(query) = &args.place {
        let place = first_place(&lookup, query).await?;
        eprintln!(
            "Using {} ({})",
            place.name.as_deref().unwrap_or("unnamed place"),
            place.coordinates
        );
        resolver.select_place(&place).await;
    } else if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        let coords = Coordinates::new(lat, lng);
        coords.validate()?;
        resolver.on_annotation_dragged(coords).await;
    } else {
        return Err(Error::Config(
            "No location specified. Use --lat/--lng, --place, or --here".to_string(),
        ));
    }

    let state = resolver.snapshot().await;
    let address = match (state.address, state.picked_location) {
        (Some(address), _) => address,
        (None, Some(coords)) => {
            return Err(Error::Geocoding(format!("No address found at {}", coords)))
        }
        (None, None) => return Err(Error::Geocoding("No address found".to_string())),
    };

    Ok((resolver, address))
}
