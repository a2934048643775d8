//! Serialization of concurrent exports to the same artifact.
//!
//! At most one encode runs per `(artifact stem, kind)` pair; later callers
//! wait for the earlier export to finish. Filenames are reduced to the stem
//! the encoders write (`"x/assets.xlsx"` and `"assets"` share a slot), so two
//! spellings of one artifact never write concurrently. Exports to different
//! artifacts do not contend. Slots are pruned once nobody holds or waits on
//! them.

use crate::encoders::artifact_stem;
use crate::models::ExportKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

type SlotKey = (String, ExportKind);

#[derive(Debug, Default)]
pub(crate) struct InFlightRegistry {
    slots: Mutex<HashMap<SlotKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl InFlightRegistry {
    /// Waits until no other export holds the artifact `filename` resolves
    /// to, then holds it until the returned guard is dropped.
    ///
    /// The guard is owned so it can travel into the task doing the encode.
    pub(crate) async fn acquire(
        self: &Arc<Self>,
        filename: &str,
        kind: ExportKind,
    ) -> InFlightGuard {
        let key = (artifact_stem(filename).to_string(), kind);
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        if slot.try_lock().is_err() {
            tracing::debug!(
                "Export of '{}' as {} already in flight, waiting",
                key.0,
                kind
            );
        }

        let guard = slot.lock_owned().await;
        InFlightGuard {
            registry: Arc::clone(self),
            key,
            guard: Some(guard),
        }
    }

    /// Number of artifacts currently held or awaited.
    pub(crate) fn active_slots(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Holds an artifact slot; releases and prunes it on drop.
pub(crate) struct InFlightGuard {
    registry: Arc<InFlightRegistry>,
    key: SlotKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut slots = self
            .registry
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(self.guard.take());

        // Only the map's own reference left: nobody holds or waits.
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}
