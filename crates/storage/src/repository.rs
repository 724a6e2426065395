//! Repository Implementation

use crate::{StorageError, TripStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory last-trip-id repository.
///
/// Cheap to clone; all clones share the same map.
#[derive(Clone, Default)]
pub struct LastTripRepository {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl LastTripRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a recorded trip.
    pub fn user_count(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TripStore for LastTripRepository {
    async fn last_trip_id(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let map = self
            .inner
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("lock error: {}", e)))?;
        Ok(map.get(user_id).cloned())
    }

    async fn set_last_trip_id(&self, user_id: &str, trip_id: &str) -> Result<(), StorageError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("lock error: {}", e)))?;
        debug!("Recording last trip {} for user {}", trip_id, user_id);
        map.insert(user_id.to_string(), trip_id.to_string());
        Ok(())
    }
}
