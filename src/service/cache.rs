use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::ChartCoordinates;

/// Snapshots older than this are treated as absent regardless of map
/// membership. Long enough to coalesce the reads of one render frame, short
/// enough that a host resize is picked up on the next frame.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(250);

/// Identity of one chart instance within the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartId(String);

impl ChartId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChartId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for ChartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[must_use]
pub fn derive_cache_key(chart_id: &ChartId, container_id: &str) -> String {
    format!("{}::{container_id}", chart_id.raw())
}

/// One cached snapshot plus its expiry bookkeeping.
#[derive(Debug, Clone)]
pub struct CoordinateCacheEntry {
    pub coordinates: Arc<ChartCoordinates>,
    pub cache_key: String,
    pub chart_id: ChartId,
    pub container_id: String,
    pub expires_at: Instant,
}

impl CoordinateCacheEntry {
    #[must_use]
    pub fn new(
        coordinates: Arc<ChartCoordinates>,
        chart_id: ChartId,
        container_id: &str,
        ttl: Duration,
    ) -> Self {
        Self {
            cache_key: derive_cache_key(&chart_id, container_id),
            coordinates,
            chart_id,
            container_id: container_id.to_owned(),
            expires_at: Instant::now() + ttl,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
