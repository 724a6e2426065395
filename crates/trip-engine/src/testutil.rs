//! Test doubles for the engine's collaborator ports.

use crate::{EngineConfig, TripEngine};
use async_trait::async_trait;
use place_lookup::PlaceDirectory;
use ride_provider::{
    GeoPoint, Place, PlaceId, Product, ProductOption, Profile, ProviderError, Receipt,
    RideEstimate, RideProvider, SavedPlaces, TripRecord,
};
use std::sync::{Arc, Mutex};
use storage::LastTripRepository;
use ui_protocol::{Command, CommandBatch, ScreenId};

/// Minimal trip record with the given provider status.
pub fn trip(status: &str) -> TripRecord {
    TripRecord {
        request_id: "t-1".to_string(),
        status: status.to_string(),
        eta: None,
        surge_multiplier: 1.0,
        driver: None,
        vehicle: None,
        destination: None,
    }
}

/// Trip record with an assigned driver and vehicle.
pub fn trip_with_driver(status: &str) -> TripRecord {
    TripRecord {
        driver: Some(ride_provider::Driver {
            name: "Ana".to_string(),
        }),
        vehicle: Some(ride_provider::Vehicle {
            make: "Toyota".to_string(),
            model: "Prius".to_string(),
            license_plate: Some("xyz-123".to_string()),
        }),
        ..trip(status)
    }
}

pub fn geo(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint {
        latitude,
        longitude,
    }
}

/// Scripted responses for [`FakeProvider`].
#[derive(Default)]
pub struct FakeProviderState {
    pub current: Option<TripRecord>,
    pub current_error: Option<ProviderError>,
    pub details: Option<TripRecord>,
    pub receipt: Option<Receipt>,
    pub receipt_error: Option<ProviderError>,
    pub estimate: Option<RideEstimate>,
    pub estimate_error: Option<ProviderError>,
    pub request: Option<TripRecord>,
    pub request_error: Option<ProviderError>,
    pub product: Option<Product>,
    pub places: SavedPlaces,
    pub products: Vec<ProductOption>,
    pub profile_uuid: String,
    pub calls: Vec<String>,
}

/// Hand-rolled ride provider double; records every call it serves.
#[derive(Clone, Default)]
pub struct FakeProvider {
    inner: Arc<Mutex<FakeProviderState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.inner.lock().unwrap().profile_uuid = "user-1".to_string();
        fake
    }

    pub fn with(configure: impl FnOnce(&mut FakeProviderState)) -> Self {
        let fake = Self::new();
        configure(&mut fake.inner.lock().unwrap());
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn record(&self, call: &str) {
        self.inner.lock().unwrap().calls.push(call.to_string());
    }

    fn unscripted(call: &str) -> ProviderError {
        ProviderError::Unavailable(format!("unscripted call: {}", call))
    }
}

#[async_trait]
impl RideProvider for FakeProvider {
    async fn current_trip(&self) -> Result<Option<TripRecord>, ProviderError> {
        self.record("current_trip");
        let state = self.inner.lock().unwrap();
        match &state.current_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.current.clone()),
        }
    }

    async fn trip_details(&self, _trip_id: &str) -> Result<TripRecord, ProviderError> {
        self.record("trip_details");
        let state = self.inner.lock().unwrap();
        state
            .details
            .clone()
            .ok_or_else(|| Self::unscripted("trip_details"))
    }

    async fn trip_receipt(&self, _trip_id: &str) -> Result<Receipt, ProviderError> {
        self.record("trip_receipt");
        let state = self.inner.lock().unwrap();
        match &state.receipt_error {
            Some(err) => Err(err.clone()),
            None => state
                .receipt
                .clone()
                .ok_or_else(|| Self::unscripted("trip_receipt")),
        }
    }

    async fn estimate_by_location(
        &self,
        _product_id: &str,
        _pickup: GeoPoint,
    ) -> Result<RideEstimate, ProviderError> {
        self.record("estimate_by_location");
        let state = self.inner.lock().unwrap();
        match &state.estimate_error {
            Some(err) => Err(err.clone()),
            None => state
                .estimate
                .ok_or_else(|| Self::unscripted("estimate_by_location")),
        }
    }

    async fn estimate_by_place(
        &self,
        _product_id: &str,
        _place: PlaceId,
    ) -> Result<RideEstimate, ProviderError> {
        self.record("estimate_by_place");
        let state = self.inner.lock().unwrap();
        match &state.estimate_error {
            Some(err) => Err(err.clone()),
            None => state
                .estimate
                .ok_or_else(|| Self::unscripted("estimate_by_place")),
        }
    }

    async fn request_at_location(
        &self,
        _product_id: &str,
        _pickup: GeoPoint,
    ) -> Result<TripRecord, ProviderError> {
        self.record("request_at_location");
        let state = self.inner.lock().unwrap();
        match &state.request_error {
            Some(err) => Err(err.clone()),
            None => state
                .request
                .clone()
                .ok_or_else(|| Self::unscripted("request_at_location")),
        }
    }

    async fn request_at_place(
        &self,
        _product_id: &str,
        _place: PlaceId,
    ) -> Result<TripRecord, ProviderError> {
        self.record("request_at_place");
        let state = self.inner.lock().unwrap();
        match &state.request_error {
            Some(err) => Err(err.clone()),
            None => state
                .request
                .clone()
                .ok_or_else(|| Self::unscripted("request_at_place")),
        }
    }

    async fn cancel_trip(&self, _trip_id: &str) -> Result<(), ProviderError> {
        self.record("cancel_trip");
        Ok(())
    }

    async fn product_details(&self, _product_id: &str) -> Result<Product, ProviderError> {
        self.record("product_details");
        let state = self.inner.lock().unwrap();
        state
            .product
            .clone()
            .ok_or_else(|| Self::unscripted("product_details"))
    }

    async fn place(&self, place: PlaceId) -> Result<Option<Place>, ProviderError> {
        self.record("place");
        let state = self.inner.lock().unwrap();
        Ok(match place {
            PlaceId::Home => state.places.home.clone(),
            PlaceId::Work => state.places.work.clone(),
        })
    }

    async fn available_places(&self) -> Result<SavedPlaces, ProviderError> {
        self.record("available_places");
        Ok(self.inner.lock().unwrap().places.clone())
    }

    async fn profile(&self) -> Result<Profile, ProviderError> {
        self.record("profile");
        Ok(Profile {
            uuid: self.inner.lock().unwrap().profile_uuid.clone(),
        })
    }

    async fn products_for_location(
        &self,
        _location: GeoPoint,
    ) -> Result<Vec<ProductOption>, ProviderError> {
        self.record("products_for_location");
        Ok(self.inner.lock().unwrap().products.clone())
    }
}

/// Place directory double returning one fixed name.
#[derive(Clone)]
pub struct FakePlaces {
    pub name: String,
}

#[async_trait]
impl PlaceDirectory for FakePlaces {
    async fn resolve_place_name(&self, _latitude: f64, _longitude: f64) -> String {
        self.name.clone()
    }
}

pub type TestEngine = TripEngine<FakeProvider, FakePlaces, LastTripRepository>;

/// Engine wired with fakes and a zero receipt delay.
pub fn engine(provider: FakeProvider, store: LastTripRepository) -> TestEngine {
    engine_with(provider, store, "Main Street", 0)
}

pub fn engine_with(
    provider: FakeProvider,
    store: LastTripRepository,
    place_name: &str,
    receipt_delay_secs: u64,
) -> TestEngine {
    TripEngine::new(
        provider,
        FakePlaces {
            name: place_name.to_string(),
        },
        store,
        EngineConfig {
            status_ttl_secs: 30,
            receipt_delay_secs,
        },
    )
}

/// `(element, value)` pairs of the SetText commands bound to a screen.
pub fn texts_on(batch: &CommandBatch, screen: ScreenId) -> Vec<(u8, String)> {
    batch
        .commands()
        .iter()
        .filter_map(|command| match command {
            Command::SetText {
                element,
                value,
                screen: Some(s),
                ..
            } if *s == screen => Some((element.0, value.clone())),
            _ => None,
        })
        .collect()
}

/// `(screen, alert)` of every ChangeScreen command, in batch order.
pub fn change_screens(batch: &CommandBatch) -> Vec<(ScreenId, bool)> {
    batch
        .commands()
        .iter()
        .filter_map(|command| match command {
            Command::ChangeScreen { screen, alert, .. } => Some((*screen, *alert)),
            _ => None,
        })
        .collect()
}

/// Wait for the detached persist task to land.
pub async fn wait_for_last_trip(store: &LastTripRepository, user_id: &str) -> Option<String> {
    use storage::TripStore;

    for _ in 0..200 {
        if let Ok(Some(id)) = store.last_trip_id(user_id).await {
            return Some(id);
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    None
}
