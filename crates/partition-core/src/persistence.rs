// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port for the two persisted booleans.
//!
//! Persistence medium is opaque, atomicity is delegated: this crate
//! only defines the read/write contract. The embedder supplies an
//! implementation backed by whatever store it likes; we deliberately
//! don't bundle a durable backend of our own here, only the in-memory
//! stand-in below.
#[async_trait::async_trait]
pub trait PersistedPauseState: Send + Sync {
    async fn load(&self) -> (bool, bool);
    async fn save(&self, processing_paused: bool, exporting_paused: bool);
}

/// An in-memory `PersistedPauseState` used where no durable store is
/// wired in (tests, or an embedder that hasn't implemented persistence
/// yet). Not suitable for production: nothing survives a restart.
#[derive(Default)]
pub struct InMemoryPauseState {
    inner: parking_lot::Mutex<(bool, bool)>,
}

#[async_trait::async_trait]
impl PersistedPauseState for InMemoryPauseState {
    async fn load(&self) -> (bool, bool) {
        *self.inner.lock()
    }

    async fn save(&self, processing_paused: bool, exporting_paused: bool) {
        *self.inner.lock() = (processing_paused, exporting_paused);
    }
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
