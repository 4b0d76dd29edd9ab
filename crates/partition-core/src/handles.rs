// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Marker/control traits for the handles a `PartitionContext` holds.
//!
//! These are the external collaborators this crate leaves out of scope
//! (the log, the stream processor, exporter/snapshot/messaging/kv-store
//! implementations). We only define the thin slice of behavior the
//! supervisor actually drives through a handle — pause/resume for the
//! stream processor and exporter, and snapshot triggering — everything
//! else about these types is opaque to this crate.

use async_trait::async_trait;

/// Opaque handle to the replicated log stream. No behavior is driven
/// through it from this crate; its only role is presence/absence.
pub trait LogStream: Send + Sync {}

/// The component that applies records from the log. Installed for
/// leaders and followers; never for inactive.
#[async_trait]
pub trait StreamProcessor: Send + Sync {
    async fn pause(&self);
    async fn resume(&self);
}

/// The component that exports processed records to external sinks.
/// Leader-only in the default transition plan.
#[async_trait]
pub trait ExporterDirector: Send + Sync {
    async fn pause(&self);
    async fn resume(&self);
}

/// Leader-only component that can be asked to snapshot on demand.
#[async_trait]
pub trait SnapshotDirector: Send + Sync {
    async fn trigger_snapshot(&self);
}

/// Opaque handle to inter-partition messaging. Presence/absence only.
pub trait MessagingService: Send + Sync {}

/// Opaque handle to the embedded key-value store. Presence/absence only.
pub trait KvStore: Send + Sync {}

/// The handles a [`PartitionContext`](crate::context::PartitionContext)
/// populates and clears as steps open and close.
///
/// Grouped in their own struct (rather than six loose `Option` fields on
/// `PartitionContext`) so `PartitionContext::handles_match_role` can be
/// written once against the whole set.
#[derive(Default, Clone)]
pub struct Handles {
    pub log_stream: Option<std::sync::Arc<dyn LogStream>>,
    pub stream_processor: Option<std::sync::Arc<dyn StreamProcessor>>,
    pub exporter_director: Option<std::sync::Arc<dyn ExporterDirector>>,
    pub snapshot_director: Option<std::sync::Arc<dyn SnapshotDirector>>,
    pub messaging_service: Option<std::sync::Arc<dyn MessagingService>>,
    pub kv_store: Option<std::sync::Arc<dyn KvStore>>,
}

impl Handles {
    /// True once every handle has been cleared — the state an inactive
    /// partition must be in.
    pub fn is_empty(&self) -> bool {
        self.log_stream.is_none()
            && self.stream_processor.is_none()
            && self.exporter_director.is_none()
            && self.snapshot_director.is_none()
            && self.messaging_service.is_none()
            && self.kv_store.is_none()
    }

    pub fn clear(&mut self) {
        *self = Handles::default();
    }
}
