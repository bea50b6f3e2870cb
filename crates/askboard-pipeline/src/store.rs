//! Fingerprint-keyed response store
//!
//! Content-addressed persistence of response envelopes. Lookup and store
//! are idempotent; a store on an existing fingerprint overwrites,
//! last-writer-wins — content is a function of the same inputs, so races
//! are benign. Store failures degrade the run (the response is still
//! returned, just not cached); they never abort it.

use crate::envelope::ResponseEnvelope;
use askboard_dataset::Fingerprint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::time::Duration;

/// Errors from a response store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable or refusing work
    #[error("store backend unavailable: {0}")]
    Unavailable(String),

    /// Stored blob could not be decoded into an envelope
    #[error("stored envelope corrupt: {0}")]
    Corrupt(String),
}

/// A cached response with its creation time
///
/// Read-only after creation; staleness against later dataset-reference
/// updates with unchanged content bytes is accepted, not detected.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The persisted envelope
    pub envelope: ResponseEnvelope,
    /// When the entry was first stored
    pub created_at: DateTime<Utc>,
}

/// Fingerprint-keyed envelope persistence
///
/// The seam for durable backends; the pipeline only needs get/put.
#[async_trait]
pub trait ResponseStore: Send + Sync + std::fmt::Debug {
    /// Look up the envelope for a fingerprint
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend fails; a miss is `Ok(None)`.
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, StoreError>;

    /// Persist an envelope under a fingerprint, overwriting any previous
    /// entry
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend fails.
    async fn store(
        &self,
        fingerprint: Fingerprint,
        envelope: &ResponseEnvelope,
    ) -> Result<(), StoreError>;
}

/// In-memory response store backed by moka
///
/// Concurrent, LRU-evicting, optionally TTL-bounded.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Cache<Fingerprint, CacheEntry>,
}

impl MemoryStore {
    /// Create a store with a maximum entry count
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create a store with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Approximate number of cached envelopes
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for MemoryStore {
    /// Create a store with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.inner.get(fingerprint).await)
    }

    async fn store(
        &self,
        fingerprint: Fingerprint,
        envelope: &ResponseEnvelope,
    ) -> Result<(), StoreError> {
        let entry = CacheEntry {
            envelope: envelope.clone(),
            created_at: Utc::now(),
        };
        self.inner.insert(fingerprint, entry).await;
        Ok(())
    }
}
