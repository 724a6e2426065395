//! Ride Provider Client
//!
//! Typed async client for the ride provider REST API with pre-classified
//! error taxonomy. The [`RideProvider`] trait is the port the trip
//! engine consumes; [`RideClient`] is the HTTP implementation.

mod client;
mod error;
mod types;

pub use client::{ProviderConfig, RideClient};
pub use error::ProviderError;
pub use types::{
    Destination, Driver, GeoPoint, Place, PlaceId, PriceEstimate, Product, ProductOption, Profile,
    Receipt, RideEstimate, SavedPlaces, TripRecord, Vehicle,
};

use async_trait::async_trait;

/// Operations the trip engine needs from the ride provider.
///
/// Implementations classify failures into [`ProviderError`] before they
/// reach the engine; absence of a resource is `Ok(None)`, not an error.
#[async_trait]
pub trait RideProvider: Send + Sync {
    /// The rider's active trip, if any.
    async fn current_trip(&self) -> Result<Option<TripRecord>, ProviderError>;

    async fn trip_details(&self, trip_id: &str) -> Result<TripRecord, ProviderError>;

    async fn trip_receipt(&self, trip_id: &str) -> Result<Receipt, ProviderError>;

    async fn estimate_by_location(
        &self,
        product_id: &str,
        pickup: GeoPoint,
    ) -> Result<RideEstimate, ProviderError>;

    async fn estimate_by_place(
        &self,
        product_id: &str,
        place: PlaceId,
    ) -> Result<RideEstimate, ProviderError>;

    async fn request_at_location(
        &self,
        product_id: &str,
        pickup: GeoPoint,
    ) -> Result<TripRecord, ProviderError>;

    async fn request_at_place(
        &self,
        product_id: &str,
        place: PlaceId,
    ) -> Result<TripRecord, ProviderError>;

    async fn cancel_trip(&self, trip_id: &str) -> Result<(), ProviderError>;

    async fn product_details(&self, product_id: &str) -> Result<Product, ProviderError>;

    /// A saved place, `None` when the rider never configured it.
    async fn place(&self, place: PlaceId) -> Result<Option<Place>, ProviderError>;

    /// Home and work fetched concurrently.
    async fn available_places(&self) -> Result<SavedPlaces, ProviderError>;

    async fn profile(&self) -> Result<Profile, ProviderError>;

    /// Products servicing a location, for the settings autocomplete.
    async fn products_for_location(
        &self,
        location: GeoPoint,
    ) -> Result<Vec<ProductOption>, ProviderError>;
}
