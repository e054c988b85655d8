//! Location resolution
//!
//! Turns a picked coordinate (search hit, current location or dragged pin)
//! into an [`Address`] and keeps the single registration payload slot up to
//! date. Every successful resolve overwrites the slots; nothing is queued or
//! merged. Concurrent resolves are not ordered: whichever completes last
//! determines the stored address.

pub mod address;

pub use address::{Address, SubmissionPayload};

use crate::error::{Error, Result};
use crate::geo::{
    Coordinates, LocationAuthorization, LocationProvider, PlaceResult, Placemark,
    ReverseGeocoder,
};
use std::future::Future;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Snapshot of the location picker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickerState {
    /// Last authorization state reported by the device
    pub authorization: LocationAuthorization,
    /// Last device location fix
    pub user_location: Option<Coordinates>,
    /// Where the pin currently is
    pub picked_location: Option<Coordinates>,
    /// Placemark shown for the pin
    pub picked_place: Option<Placemark>,
    /// Address from the most recent successful resolve
    pub address: Option<Address>,
    /// Payload sent on submit
    pub payload: Option<SubmissionPayload>,
}

/// Callbacks from the device location and map collaborators
pub trait LocationEvents: Send + Sync {
    /// Location authorization changed
    fn on_authorization_changed(
        &self,
        status: LocationAuthorization,
    ) -> impl Future<Output = ()> + Send;

    /// The device reported a new position
    fn on_location_updated(&self, coords: Coordinates) -> impl Future<Output = ()> + Send;

    /// The pin was dropped at a new position
    fn on_annotation_dragged(&self, coords: Coordinates) -> impl Future<Output = ()> + Send;
}

/// Resolves picked coordinates to addresses and owns the picker state
#[derive(Debug)]
pub struct LocationResolver<G, P> {
    geocoder: G,
    locator: P,
    state: RwLock<PickerState>,
}

impl<G: ReverseGeocoder, P: LocationProvider> LocationResolver<G, P> {
    /// Create a resolver with empty state
    pub fn new(geocoder: G, locator: P) -> Self {
        Self {
            geocoder,
            locator,
            state: RwLock::new(PickerState::default()),
        }
    }

    /// Reverse geocode `coords` and store the first candidate
    ///
    /// On success the address, payload and displayed placemark are replaced
    /// together. With no candidates or on failure the state is left exactly
    /// as it was, including a placemark from an earlier pin position.
    pub async fn resolve(&self, coords: Coordinates) -> Result<Address> {
        coords.validate()?;

        let placemarks = self.geocoder.reverse_geocode(coords).await?;
        let Some(placemark) = placemarks.into_iter().next() else {
            return Err(Error::NoPlacemark {
                lat: coords.lat,
                lng: coords.lng,
            });
        };

        let address = Address::from_placemark(&placemark);
        debug!(%coords, %address, "resolved");

        let mut state = self.state.write().await;
        state.payload = Some(SubmissionPayload::from(&address));
        state.address = Some(address.clone());
        state.picked_place = Some(placemark);

        Ok(address)
    }

    /// Resolve and swallow the outcome
    async fn update_placemark(&self, coords: Coordinates) {
        match self.resolve(coords).await {
            Ok(_) => {}
            Err(e @ Error::NoPlacemark { .. }) => debug!("{}", e),
            Err(e) => warn!("reverse geocoding failed: {}", e),
        }
    }

    /// A search result was picked
    pub async fn select_place(&self, place: &PlaceResult) {
        self.state.write().await.picked_location = Some(place.coordinates);
        self.update_placemark(place.coordinates).await;
    }

    /// Pick the last device fix; false when there is none yet
    pub async fn use_current_location(&self) -> bool {
        let Some(coords) = self.state.read().await.user_location else {
            return false;
        };
        self.state.write().await.picked_location = Some(coords);
        self.update_placemark(coords).await;
        true
    }

    /// The picker was closed
    ///
    /// Clears the pin and displayed placemark. The payload slot keeps its
    /// last value.
    pub async fn dismiss(&self) {
        let mut state = self.state.write().await;
        state.picked_location = None;
        state.picked_place = None;
    }

    /// Current payload, if any resolve has succeeded
    pub async fn payload(&self) -> Option<SubmissionPayload> {
        self.state.read().await.payload.clone()
    }

    /// Copy of the whole picker state
    pub async fn snapshot(&self) -> PickerState {
        self.state.read().await.clone()
    }

    /// Ask the device for its position and record it
    async fn request_location(&self) {
        match self.locator.current_location().await {
            Ok(coords) => self.on_location_updated(coords).await,
            Err(e) => self.handle_location_error(&e),
        }
    }

    fn handle_location_error(&self, error: &Error) {
        warn!("current location unavailable: {}", error);
    }
}

impl<G: ReverseGeocoder, P: LocationProvider> LocationEvents for LocationResolver<G, P> {
    async fn on_authorization_changed(&self, status: LocationAuthorization) {
        let mut status = status;
        loop {
            self.state.write().await.authorization = status;
            match status {
                LocationAuthorization::WhenInUse | LocationAuthorization::Always => {
                    self.request_location().await;
                    break;
                }
                LocationAuthorization::Denied => {
                    self.handle_location_error(&Error::PermissionDenied);
                    break;
                }
                LocationAuthorization::NotDetermined => {
                    let next = self.locator.request_when_in_use_authorization().await;
                    if next == LocationAuthorization::NotDetermined {
                        break;
                    }
                    status = next;
                }
            }
        }
    }

    async fn on_location_updated(&self, coords: Coordinates) {
        info!(%coords, "device location updated");
        self.state.write().await.user_location = Some(coords);
    }

    async fn on_annotation_dragged(&self, coords: Coordinates) {
        self.state.write().await.picked_location = Some(coords);
        self.update_placemark(coords).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    /// Answers by latitude:
    /// 1 => Austin after 200ms, 2 => Dallas after 50ms, 3 => bare placemark,
    /// 0 => no candidates, anything else => provider error
    #[derive(Default)]
    struct FakeGeocoder {
        calls: AtomicUsize,
    }

    fn placemark(name: &str, city: &str) -> Placemark {
        Placemark {
            name: Some(name.to_string()),
            locality: Some(city.to_string()),
            administrative_area: Some("TX".to_string()),
            country: Some("USA".to_string()),
            thoroughfare: Some("100 Main St".to_string()),
            postal_code: Some("78701".to_string()),
        }
    }

    impl ReverseGeocoder for FakeGeocoder {
        async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<Placemark>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match coords.lat as i64 {
                1 => {
                    sleep(Duration::from_millis(200)).await;
                    Ok(vec![
                        placemark("Main St Clinic", "Austin"),
                        placemark("Ignored", "Elsewhere"),
                    ])
                }
                2 => {
                    sleep(Duration::from_millis(50)).await;
                    Ok(vec![placemark("Elm St Clinic", "Dallas")])
                }
                3 => Ok(vec![Placemark::default()]),
                0 => Ok(Vec::new()),
                _ => Err(Error::Geocoding("network unreachable".to_string())),
            }
        }
    }

    struct FakeLocator {
        grant: LocationAuthorization,
        fix: Option<Coordinates>,
        requests: Mutex<Vec<&'static str>>,
    }

    impl FakeLocator {
        fn new(grant: LocationAuthorization, fix: Option<Coordinates>) -> Self {
            Self {
                grant,
                fix,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<&'static str> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl LocationProvider for FakeLocator {
        fn authorization(&self) -> LocationAuthorization {
            self.grant
        }

        async fn request_when_in_use_authorization(&self) -> LocationAuthorization {
            self.requests.lock().unwrap().push("authorization");
            self.grant
        }

        async fn current_location(&self) -> Result<Coordinates> {
            self.requests.lock().unwrap().push("location");
            self.fix.ok_or_else(|| Error::Location("no fix".to_string()))
        }
    }

    fn resolver() -> LocationResolver<FakeGeocoder, FakeLocator> {
        LocationResolver::new(
            FakeGeocoder::default(),
            FakeLocator::new(LocationAuthorization::WhenInUse, Some(Coordinates::new(2.0, 2.0))),
        )
    }

    const AUSTIN: Coordinates = Coordinates { lat: 1.0, lng: 1.0 };
    const DALLAS: Coordinates = Coordinates { lat: 2.0, lng: 2.0 };
    const BARE: Coordinates = Coordinates { lat: 3.0, lng: 3.0 };
    const NOWHERE: Coordinates = Coordinates { lat: 0.0, lng: 0.0 };
    const BROKEN: Coordinates = Coordinates { lat: 5.0, lng: 5.0 };

    #[tokio::test(start_paused = true)]
    async fn test_resolve_uses_first_candidate() {
        let resolver = resolver();
        let address = resolver.resolve(AUSTIN).await.unwrap();

        assert_eq!(address.city, "Austin");
        assert_eq!(address.name, "Main St Clinic");
        assert_eq!(address.state, "TX");
        assert_eq!(address.street_address, "100 Main St");
        assert_eq!(address.zip_code, "78701");

        let state = resolver.snapshot().await;
        assert_eq!(state.address.as_ref(), Some(&address));
        assert_eq!(state.payload, Some(SubmissionPayload::from(&address)));
        assert_eq!(
            state.picked_place.and_then(|p| p.name).as_deref(),
            Some("Main St Clinic")
        );
    }

    #[tokio::test]
    async fn test_resolve_all_fields_absent() {
        let resolver = resolver();
        let address = resolver.resolve(BARE).await.unwrap();

        assert_eq!(address, Address::default());
        assert_eq!(resolver.payload().await, Some(SubmissionPayload::default()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_overwrites_previous_address() {
        let resolver = resolver();
        resolver.resolve(AUSTIN).await.unwrap();
        resolver.resolve(DALLAS).await.unwrap();

        let payload = resolver.payload().await.unwrap();
        assert_eq!(payload.city, "Dallas");
        assert_eq!(payload.name, "Elm St Clinic");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_candidates_leaves_state_untouched() {
        let resolver = resolver();
        resolver.resolve(AUSTIN).await.unwrap();
        let before = resolver.snapshot().await;

        let err = resolver.resolve(NOWHERE).await.unwrap_err();
        assert!(matches!(err, Error::NoPlacemark { .. }));
        assert_eq!(resolver.snapshot().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_failure_leaves_state_untouched() {
        let resolver = resolver();
        resolver.resolve(AUSTIN).await.unwrap();
        let before = resolver.snapshot().await;

        let err = resolver.resolve(BROKEN).await.unwrap_err();
        assert!(matches!(err, Error::Geocoding(_)));
        assert_eq!(resolver.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_skip_provider() {
        let resolver = resolver();
        let err = resolver.resolve(Coordinates::new(95.0, 0.0)).await.unwrap_err();

        assert!(matches!(err, Error::InvalidCoordinates(_)));
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_to_complete_wins() {
        let resolver = resolver();

        // Austin is issued first but completes after Dallas
        let (a, b) = tokio::join!(resolver.resolve(AUSTIN), resolver.resolve(DALLAS));
        assert!(a.is_ok() && b.is_ok());

        let state = resolver.snapshot().await;
        assert_eq!(state.address.map(|a| a.city).as_deref(), Some("Austin"));
        assert_eq!(state.payload.map(|p| p.city).as_deref(), Some("Austin"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_moves_pin_and_resolves() {
        let resolver = resolver();
        resolver.on_annotation_dragged(DALLAS).await;

        let state = resolver.snapshot().await;
        assert_eq!(state.picked_location, Some(DALLAS));
        assert_eq!(state.payload.map(|p| p.city).as_deref(), Some("Dallas"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_to_nowhere_keeps_stale_placemark() {
        let resolver = resolver();
        resolver.on_annotation_dragged(AUSTIN).await;
        resolver.on_annotation_dragged(NOWHERE).await;

        let state = resolver.snapshot().await;
        assert_eq!(state.picked_location, Some(NOWHERE));
        assert_eq!(
            state.picked_place.and_then(|p| p.locality).as_deref(),
            Some("Austin")
        );
        assert_eq!(state.payload.map(|p| p.city).as_deref(), Some("Austin"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_place_picks_and_resolves() {
        let resolver = resolver();
        let place = PlaceResult {
            name: Some("Main St Clinic".to_string()),
            locality: Some("Austin".to_string()),
            coordinates: AUSTIN,
        };
        resolver.select_place(&place).await;

        let state = resolver.snapshot().await;
        assert_eq!(state.picked_location, Some(AUSTIN));
        assert_eq!(state.address.map(|a| a.name).as_deref(), Some("Main St Clinic"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_granted_authorization_records_fix() {
        let resolver = resolver();
        resolver
            .on_authorization_changed(LocationAuthorization::Always)
            .await;

        let state = resolver.snapshot().await;
        assert_eq!(state.authorization, LocationAuthorization::Always);
        assert_eq!(state.user_location, Some(DALLAS));
        assert_eq!(resolver.locator.requests(), vec!["location"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undetermined_requests_permission_then_location() {
        let resolver = resolver();
        resolver
            .on_authorization_changed(LocationAuthorization::NotDetermined)
            .await;

        let state = resolver.snapshot().await;
        assert_eq!(state.authorization, LocationAuthorization::WhenInUse);
        assert_eq!(state.user_location, Some(DALLAS));
        assert_eq!(resolver.locator.requests(), vec!["authorization", "location"]);
    }

    #[tokio::test]
    async fn test_denied_does_not_request_location() {
        let resolver = LocationResolver::new(
            FakeGeocoder::default(),
            FakeLocator::new(LocationAuthorization::Denied, Some(DALLAS)),
        );
        resolver
            .on_authorization_changed(LocationAuthorization::NotDetermined)
            .await;

        let state = resolver.snapshot().await;
        assert_eq!(state.authorization, LocationAuthorization::Denied);
        assert_eq!(state.user_location, None);
        assert_eq!(resolver.locator.requests(), vec!["authorization"]);
    }

    #[tokio::test]
    async fn test_location_failure_is_swallowed() {
        let resolver = LocationResolver::new(
            FakeGeocoder::default(),
            FakeLocator::new(LocationAuthorization::WhenInUse, None),
        );
        resolver
            .on_authorization_changed(LocationAuthorization::WhenInUse)
            .await;

        assert_eq!(resolver.snapshot().await.user_location, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_use_current_location() {
        let resolver = resolver();
        assert!(!resolver.use_current_location().await);

        resolver.on_location_updated(DALLAS).await;
        assert!(resolver.use_current_location().await);

        let state = resolver.snapshot().await;
        assert_eq!(state.picked_location, Some(DALLAS));
        assert_eq!(state.address.map(|a| a.city).as_deref(), Some("Dallas"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_clears_pin_but_keeps_payload() {
        let resolver = resolver();
        resolver.on_annotation_dragged(AUSTIN).await;
        resolver.dismiss().await;

        let state = resolver.snapshot().await;
        assert_eq!(state.picked_location, None);
        assert_eq!(state.picked_place, None);
        assert!(state.payload.is_some());
    }
}
