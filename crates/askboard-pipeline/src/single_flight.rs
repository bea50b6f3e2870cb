//! Single-flight execution
//!
//! At most one pipeline execution runs per fingerprint at a time.
//! Concurrent identical requests coalesce onto the in-flight computation
//! and every caller receives the same outcome — redundant invocations of a
//! costly, non-deterministic agent would otherwise race to cache divergent
//! answers under one key. This is a required contract here, not an
//! emergent property: nothing below this layer serializes per key.

use crate::envelope::ResponseEnvelope;
use crate::error::PipelineError;
use askboard_dataset::Fingerprint;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

type FlightOutcome = Result<ResponseEnvelope, Arc<PipelineError>>;
type FlightSlot = watch::Receiver<Option<FlightOutcome>>;

/// Per-fingerprint coalescing of concurrent executions
#[derive(Debug, Default)]
pub struct SingleFlight {
    inflight: DashMap<Fingerprint, FlightSlot>,
}

impl SingleFlight {
    /// Create an empty flight table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    /// Number of executions currently in flight
    #[inline]
    #[must_use]
    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }

    /// Run `compute` for `key`, coalescing with any in-flight execution
    ///
    /// The first caller for a key becomes the leader and computes; callers
    /// arriving while the computation is in flight await its outcome.
    /// Failures are shared across coalesced callers via
    /// [`PipelineError::Shared`]. A leader that is cancelled before
    /// producing a value yields [`PipelineError::Cancelled`] to its
    /// followers.
    ///
    /// # Errors
    /// Propagates the computation's error to every coalesced caller.
    pub async fn run<F, Fut>(
        &self,
        key: Fingerprint,
        compute: F,
    ) -> Result<ResponseEnvelope, PipelineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResponseEnvelope, PipelineError>>,
    {
        enum Role {
            Leader(watch::Sender<Option<FlightOutcome>>),
            Follower(FlightSlot),
        }

        let role = match self.inflight.entry(key) {
            Entry::Occupied(entry) => Role::Follower(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Leader(tx) => {
                // Removes the slot even if the computation is cancelled.
                let _guard = FlightGuard {
                    inflight: &self.inflight,
                    key,
                };
                tracing::debug!(fingerprint = %key.short(), "leading execution");
                let outcome = compute().await.map_err(Arc::new);
                let _ = tx.send(Some(outcome.clone()));
                outcome.map_err(PipelineError::Shared)
            }
            Role::Follower(mut rx) => {
                tracing::debug!(fingerprint = %key.short(), "coalescing onto in-flight execution");
                loop {
                    {
                        let slot = rx.borrow_and_update();
                        if let Some(outcome) = slot.as_ref() {
                            return outcome.clone().map_err(PipelineError::Shared);
                        }
                    }
                    if rx.changed().await.is_err() {
                        return Err(PipelineError::Cancelled);
                    }
                }
            }
        }
    }
}

struct FlightGuard<'a> {
    inflight: &'a DashMap<Fingerprint, FlightSlot>,
    key: Fingerprint,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.inflight.remove(&self.key);
    }
}
