//! Storage Layer
//!
//! Persists the single fact this system owns across invocations: the
//! last trip id observed for each user.

mod repository;

pub use repository::LastTripRepository;

use async_trait::async_trait;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Port for the per-user last-trip-id fact.
///
/// Writes are idempotent upserts keyed by user id; reads tolerate
/// staleness, so no locking beyond the repository's own is needed.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn last_trip_id(&self, user_id: &str) -> Result<Option<String>, StorageError>;

    async fn set_last_trip_id(&self, user_id: &str, trip_id: &str) -> Result<(), StorageError>;
}
