//! Device ride operations
//!
//! Estimate, request, cancel, and choose-location flows. Independent
//! collaborator calls are issued concurrently and joined with
//! all-or-nothing semantics; any failure routes through recovery.

use crate::render::multiplier_label;
use crate::{recovery, status, InvocationContext, TripEngine};
use place_lookup::PlaceDirectory;
use ride_provider::{GeoPoint, PlaceId, ProductOption, ProviderError, RideProvider};
use storage::TripStore;
use tracing::debug;
use ui_protocol::{
    element, icon, Animation, Command, CommandBatch, ElementId, ListItem, ScreenId, Ttl, UiAction,
};

/// Where the rider wants to be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupSource {
    Locate,
    Home,
    Work,
}

impl PickupSource {
    /// Wire ids from the choose-location list.
    pub fn from_wire(id: u8) -> Self {
        match id {
            1 => Self::Home,
            2 => Self::Work,
            _ => Self::Locate,
        }
    }

    pub fn wire_id(self) -> u8 {
        match self {
            Self::Locate => 0,
            Self::Home => 1,
            Self::Work => 2,
        }
    }
}

impl<P, D, S> TripEngine<P, D, S>
where
    P: RideProvider + Clone + 'static,
    D: PlaceDirectory,
    S: TripStore + Clone + 'static,
{
    /// Products available around the device, for the settings screen.
    /// Without a location there is nothing to offer.
    pub async fn product_options(
        &self,
        location: Option<GeoPoint>,
    ) -> Result<Vec<ProductOption>, ProviderError> {
        match location {
            Some(location) => self.provider.products_for_location(location).await,
            None => Ok(Vec::new()),
        }
    }

    /// Choose-location entry: jump to the live trip when there is one,
    /// otherwise list the pickup options.
    pub async fn load_choose_location(&self) -> CommandBatch {
        match self.try_load_choose_location().await {
            Ok(batch) => batch,
            Err(err) => recovery::provider_failure(&err),
        }
    }

    async fn try_load_choose_location(&self) -> Result<CommandBatch, ProviderError> {
        if let Some(trip) = self.provider.current_trip().await? {
            self.persist_trip_id(&trip.request_id);
            let binding = status::binding_for(status::classify(Some(&trip)));
            debug!("active trip found, jumping to {:?}", binding.screen);
            return Ok(CommandBatch::from(vec![Command::change_screen(
                binding.screen,
            )]));
        }

        let places = self.provider.available_places().await?;
        let mut items = vec![ListItem::with_action(
            PickupSource::Locate.wire_id(),
            "Locate Me",
            UiAction::ChangeScreen {
                screen: ScreenId::RetrieveLocation,
            },
        )];
        if let Some(home) = places.home {
            items.push(ListItem::with_action(
                PickupSource::Home.wire_id(),
                format!("Home: {}", home.address),
                UiAction::ChangeScreen {
                    screen: ScreenId::EstimatePlace,
                },
            ));
        }
        if let Some(work) = places.work {
            items.push(ListItem::with_action(
                PickupSource::Work.wire_id(),
                format!("Work: {}", work.address),
                UiAction::ChangeScreen {
                    screen: ScreenId::EstimatePlace,
                },
            ));
        }

        let mut batch = CommandBatch::new();
        batch.push(Command::SetList {
            items,
            ttl: Some(Ttl::ExpireOnScreenEnter),
        });
        Ok(batch)
    }

    /// Fare/pickup estimate for the chosen source, surge-gated.
    pub async fn estimate(&self, source: PickupSource, ctx: &InvocationContext) -> CommandBatch {
        match self.try_estimate(source, ctx).await {
            Ok(batch) => batch,
            Err(err) => recovery::provider_failure(&err),
        }
    }

    async fn try_estimate(
        &self,
        source: PickupSource,
        ctx: &InvocationContext,
    ) -> Result<CommandBatch, ProviderError> {
        let product_id = match &ctx.product_id {
            Some(id) => id.clone(),
            None => return Ok(recovery::invalid_product()),
        };

        let mut batch = CommandBatch::new();

        let (estimate, address, product, screen) = match source {
            PickupSource::Home | PickupSource::Work => {
                let place = if source == PickupSource::Home {
                    PlaceId::Home
                } else {
                    PlaceId::Work
                };
                batch.push(Command::clear(
                    ScreenId::EstimatePlace,
                    element::STATUS_PLACEHOLDER,
                    Ttl::ExpireOnScreenEnter,
                ));

                let (estimate, place_record, product) = tokio::try_join!(
                    self.provider.estimate_by_place(&product_id, place),
                    self.provider.place(place),
                    self.provider.product_details(&product_id),
                )?;
                let address = place_record
                    .map(|p| p.address)
                    .unwrap_or_else(|| place_lookup::UNKNOWN_PLACE.to_string());
                (estimate, address, product, ScreenId::EstimatePlace)
            }
            PickupSource::Locate => {
                batch.push(Command::clear(
                    ScreenId::RetrieveLocation,
                    element::LOCATE_PLACEHOLDER,
                    Ttl::ExpireOnScreenEnter,
                ));

                let location = match ctx.location {
                    Some(location) => location,
                    None => {
                        batch.append(recovery::missing_location());
                        return Ok(batch);
                    }
                };

                let (estimate, address, product) = tokio::join!(
                    self.provider.estimate_by_location(&product_id, location),
                    self.places
                        .resolve_place_name(location.latitude, location.longitude),
                    self.provider.product_details(&product_id),
                );
                (estimate?, address, product?, ScreenId::EstimateLocation)
            }
        };

        // Surge gating is a business rule on the success path: anything
        // above 1 blocks both the estimate display and the request.
        if estimate.price.surge_multiplier > 1.0 {
            batch.append(recovery::surge_confirmation());
            return Ok(batch);
        }

        let eta = estimate
            .pickup_estimate
            .map(|minutes| minutes.to_string())
            .unwrap_or_else(|| "?".to_string());
        batch.push(Command::text(screen, ElementId(1), address));
        batch.push(Command::text(
            screen,
            ElementId(2),
            format!("{} {} MIN", icon::CLOCK, eta),
        ));
        batch.push(Command::text(
            screen,
            ElementId(3),
            format!(
                "{} {} x",
                icon::MULTIPLIER,
                multiplier_label(estimate.price.surge_multiplier)
            ),
        ));
        batch.push(Command::text(
            screen,
            ElementId(4),
            format!("Request {}", product.display_name),
        ));
        batch.push(Command::change_screen(screen));
        Ok(batch)
    }

    /// Request a ride at the chosen pickup.
    pub async fn request_ride(
        &self,
        source: PickupSource,
        ctx: &InvocationContext,
    ) -> CommandBatch {
        match self.try_request_ride(source, ctx).await {
            Ok(batch) => batch,
            Err(err) => recovery::provider_failure(&err),
        }
    }

    async fn try_request_ride(
        &self,
        source: PickupSource,
        ctx: &InvocationContext,
    ) -> Result<CommandBatch, ProviderError> {
        let product_id = match &ctx.product_id {
            Some(id) => id.clone(),
            None => return Ok(recovery::invalid_product()),
        };

        let trip = match source {
            PickupSource::Home => {
                self.provider
                    .request_at_place(&product_id, PlaceId::Home)
                    .await?
            }
            PickupSource::Work => {
                self.provider
                    .request_at_place(&product_id, PlaceId::Work)
                    .await?
            }
            PickupSource::Locate => {
                let location = match ctx.location {
                    Some(location) => location,
                    None => return Ok(recovery::missing_location()),
                };
                self.provider
                    .request_at_location(&product_id, location)
                    .await?
            }
        };

        self.persist_trip_id(&trip.request_id);
        Ok(CommandBatch::from(vec![Command::change_screen(
            ScreenId::Searching,
        )]))
    }

    /// Cancel the pending request. An in-progress trip cannot be
    /// canceled from the wearable; the device is sent back to the trip
    /// screen instead.
    pub async fn cancel_ride(&self) -> CommandBatch {
        match self.try_cancel_ride().await {
            Ok(batch) => batch,
            Err(err) => recovery::provider_failure(&err),
        }
    }

    async fn try_cancel_ride(&self) -> Result<CommandBatch, ProviderError> {
        let trip = match self.provider.current_trip().await? {
            Some(trip) => trip,
            None => return Ok(CommandBatch::new()),
        };

        if trip.status == "in_progress" {
            return Ok(CommandBatch::from(vec![Command::ChangeScreen {
                screen: ScreenId::Trip,
                animation: Some(Animation::None),
                alert: false,
            }]));
        }

        self.provider.cancel_trip(&trip.request_id).await?;
        Ok(recovery::trip_canceled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::{
        MSG_INVALID_PRODUCT, MSG_NO_DRIVERS, MSG_NO_LOCATION, MSG_SURGE, MSG_TRIP_CANCELED,
    };
    use crate::testutil::{
        change_screens, engine, geo, texts_on, trip, wait_for_last_trip, FakeProvider,
    };
    use ride_provider::{Place, PriceEstimate, RideEstimate};
    use storage::LastTripRepository;

    fn estimate_with_surge(surge: f64) -> RideEstimate {
        RideEstimate {
            pickup_estimate: Some(5),
            price: PriceEstimate {
                surge_multiplier: surge,
            },
        }
    }

    fn saved_place(address: &str) -> Place {
        Place {
            address: address.to_string(),
        }
    }

    fn ctx_with_location() -> InvocationContext {
        InvocationContext {
            location: Some(geo(44.43, 26.09)),
            product_id: Some("X".to_string()),
        }
    }

    #[tokio::test]
    async fn test_surge_gates_every_pickup_source() {
        for source in [PickupSource::Locate, PickupSource::Home, PickupSource::Work] {
            let provider = FakeProvider::with(|state| {
                state.estimate = Some(estimate_with_surge(1.4));
                state.product = Some(ride_provider::Product {
                    display_name: "Economy".to_string(),
                });
                state.places.home = Some(saved_place("1 Main St"));
                state.places.work = Some(saved_place("2 Work Rd"));
            });
            let engine = engine(provider.clone(), LastTripRepository::new());

            let batch = engine.estimate(source, &ctx_with_location()).await;

            let texts = texts_on(&batch, ScreenId::Error);
            assert!(
                texts.iter().any(|(_, v)| v == MSG_SURGE),
                "source {:?} must be surge-gated",
                source
            );
            assert!(matches!(
                batch.commands().last(),
                Some(Command::ChangeScreen {
                    screen: ScreenId::Error,
                    alert: true,
                    ..
                })
            ));
            let calls = provider.calls();
            assert!(
                !calls.iter().any(|c| c.starts_with("request_at")),
                "a gated estimate must never issue a request"
            );
        }
    }

    #[tokio::test]
    async fn test_estimate_renders_fields_then_screen_change() {
        let provider = FakeProvider::with(|state| {
            state.estimate = Some(estimate_with_surge(1.0));
            state.product = Some(ride_provider::Product {
                display_name: "Economy".to_string(),
            });
        });
        let engine = engine(provider, LastTripRepository::new());

        let batch = engine
            .estimate(PickupSource::Locate, &ctx_with_location())
            .await;

        let fields = texts_on(&batch, ScreenId::EstimateLocation);
        assert!(fields.iter().any(|(e, v)| *e == 1 && v == "Main Street"));
        assert!(fields.iter().any(|(e, v)| *e == 2 && v.contains("5 MIN")));
        assert!(fields.iter().any(|(e, v)| *e == 3 && v.contains("1.0")));
        assert!(fields.iter().any(|(e, v)| *e == 4 && v == "Request Economy"));
        assert_eq!(
            change_screens(&batch),
            vec![(ScreenId::EstimateLocation, false)]
        );
        assert!(matches!(
            batch.commands().last(),
            Some(Command::ChangeScreen { .. })
        ));
    }

    #[tokio::test]
    async fn test_estimate_by_place_uses_saved_address() {
        let provider = FakeProvider::with(|state| {
            state.estimate = Some(estimate_with_surge(1.0));
            state.product = Some(ride_provider::Product {
                display_name: "Economy".to_string(),
            });
            state.places.home = Some(saved_place("1 Main St"));
        });
        let engine = engine(provider, LastTripRepository::new());

        let batch = engine
            .estimate(PickupSource::Home, &ctx_with_location())
            .await;

        let fields = texts_on(&batch, ScreenId::EstimatePlace);
        // Leading loading clear, then the saved address.
        assert!(fields.iter().any(|(e, v)| *e == 1 && v.is_empty()));
        assert!(fields.iter().any(|(e, v)| *e == 1 && v == "1 Main St"));
        assert_eq!(
            change_screens(&batch),
            vec![(ScreenId::EstimatePlace, false)]
        );
    }

    #[tokio::test]
    async fn test_estimate_missing_location_alerts() {
        let provider = FakeProvider::new();
        let engine = engine(provider.clone(), LastTripRepository::new());
        let ctx = InvocationContext {
            location: None,
            product_id: Some("X".to_string()),
        };

        let batch = engine.estimate(PickupSource::Locate, &ctx).await;

        let texts = texts_on(&batch, ScreenId::Error);
        assert!(texts.iter().any(|(_, v)| v == MSG_NO_LOCATION));
        assert!(!provider
            .calls()
            .iter()
            .any(|c| c.starts_with("estimate_by")));
    }

    #[tokio::test]
    async fn test_estimate_without_product_setting() {
        let engine = engine(FakeProvider::new(), LastTripRepository::new());
        let ctx = InvocationContext {
            location: Some(geo(44.43, 26.09)),
            product_id: None,
        };

        let batch = engine.estimate(PickupSource::Locate, &ctx).await;

        let texts = texts_on(&batch, ScreenId::Error);
        assert!(texts.iter().any(|(_, v)| v == MSG_INVALID_PRODUCT));
    }

    #[tokio::test]
    async fn test_request_ride_jumps_to_searching_and_persists() {
        let mut requested = trip("processing");
        requested.request_id = "t-5".to_string();
        let provider = FakeProvider::with(|state| {
            state.request = Some(requested);
        });
        let store = LastTripRepository::new();
        let engine = engine(provider, store.clone());

        let batch = engine
            .request_ride(PickupSource::Locate, &ctx_with_location())
            .await;

        assert_eq!(change_screens(&batch), vec![(ScreenId::Searching, false)]);
        assert_eq!(
            wait_for_last_trip(&store, "user-1").await.as_deref(),
            Some("t-5")
        );
    }

    #[tokio::test]
    async fn test_request_ride_no_drivers() {
        let provider = FakeProvider::with(|state| {
            state.request_error = Some(ProviderError::NoDriversAvailable);
        });
        let engine = engine(provider, LastTripRepository::new());

        let batch = engine
            .request_ride(PickupSource::Home, &ctx_with_location())
            .await;

        let texts = texts_on(&batch, ScreenId::Error);
        assert!(texts.iter().any(|(_, v)| v == MSG_NO_DRIVERS));
    }

    #[tokio::test]
    async fn test_request_ride_surge_error() {
        let provider = FakeProvider::with(|state| {
            state.request_error = Some(ProviderError::SurgeActive);
        });
        let engine = engine(provider, LastTripRepository::new());

        let batch = engine
            .request_ride(PickupSource::Work, &ctx_with_location())
            .await;

        let texts = texts_on(&batch, ScreenId::Error);
        assert!(texts.iter().any(|(_, v)| v == MSG_SURGE));
    }

    #[tokio::test]
    async fn test_request_ride_missing_location() {
        let provider = FakeProvider::new();
        let engine = engine(provider.clone(), LastTripRepository::new());
        let ctx = InvocationContext {
            location: None,
            product_id: Some("X".to_string()),
        };

        let batch = engine.request_ride(PickupSource::Locate, &ctx).await;

        let texts = texts_on(&batch, ScreenId::Error);
        assert!(texts.iter().any(|(_, v)| v == MSG_NO_LOCATION));
        assert!(!provider
            .calls()
            .iter()
            .any(|c| c.starts_with("request_at")));
    }

    #[tokio::test]
    async fn test_cancel_without_trip_is_empty() {
        let engine = engine(FakeProvider::new(), LastTripRepository::new());
        let batch = engine.cancel_ride().await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_in_progress_returns_to_trip_screen() {
        let provider = FakeProvider::with(|state| {
            state.current = Some(trip("in_progress"));
        });
        let engine = engine(provider.clone(), LastTripRepository::new());

        let batch = engine.cancel_ride().await;

        assert_eq!(batch.len(), 1);
        assert!(matches!(
            batch.commands()[0],
            Command::ChangeScreen {
                screen: ScreenId::Trip,
                animation: Some(Animation::None),
                alert: false,
            }
        ));
        assert!(!provider.calls().contains(&"cancel_trip".to_string()));
    }

    #[tokio::test]
    async fn test_cancel_pending_trip() {
        let provider = FakeProvider::with(|state| {
            state.current = Some(trip("processing"));
        });
        let engine = engine(provider.clone(), LastTripRepository::new());

        let batch = engine.cancel_ride().await;

        assert!(provider.calls().contains(&"cancel_trip".to_string()));
        let texts = texts_on(&batch, ScreenId::Error);
        assert!(texts.iter().any(|(_, v)| v == MSG_TRIP_CANCELED));
    }

    #[tokio::test]
    async fn test_choose_location_with_active_trip_jumps_to_its_screen() {
        let provider = FakeProvider::with(|state| {
            state.current = Some(trip("accepted"));
        });
        let store = LastTripRepository::new();
        let engine = engine(provider, store.clone());

        let batch = engine.load_choose_location().await;

        assert_eq!(change_screens(&batch), vec![(ScreenId::Arriving, false)]);
        assert_eq!(
            wait_for_last_trip(&store, "user-1").await.as_deref(),
            Some("t-1")
        );
    }

    #[tokio::test]
    async fn test_choose_location_lists_saved_places() {
        let provider = FakeProvider::with(|state| {
            state.places.home = Some(saved_place("1 Main St"));
            state.places.work = Some(saved_place("2 Work Rd"));
        });
        let engine = engine(provider, LastTripRepository::new());

        let batch = engine.load_choose_location().await;

        let (items, ttl) = match &batch.commands()[0] {
            Command::SetList { items, ttl } => (items.clone(), *ttl),
            other => panic!("expected SetList, got {:?}", other),
        };
        assert_eq!(ttl, Some(Ttl::ExpireOnScreenEnter));
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "Locate Me");
        assert_eq!(items[1].text, "Home: 1 Main St");
        assert_eq!(items[2].text, "Work: 2 Work Rd");
        assert_eq!(
            items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn test_choose_location_without_saved_places() {
        let engine = engine(FakeProvider::new(), LastTripRepository::new());

        let batch = engine.load_choose_location().await;

        match &batch.commands()[0] {
            Command::SetList { items, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].text, "Locate Me");
            }
            other => panic!("expected SetList, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_product_options_require_location() {
        let provider = FakeProvider::with(|state| {
            state.products = vec![ProductOption {
                product_id: "p-1".to_string(),
                display_name: "Economy".to_string(),
            }];
        });
        let engine = engine(provider, LastTripRepository::new());

        assert!(engine.product_options(None).await.unwrap().is_empty());

        let options = engine
            .product_options(Some(geo(44.43, 26.09)))
            .await
            .unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].display_name, "Economy");
    }
}
