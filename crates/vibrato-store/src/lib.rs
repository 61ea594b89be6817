// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable JSON persistence for the Vibrato playback coordinator.
//!
//! One JSON document per logical key, whole-document replace, atomic with
//! respect to concurrent reads. Two backings implement the
//! [`DocumentStore`](vibrato_core::traits::DocumentStore) trait:
//! [`FileStore`] for durable on-disk state and [`MemoryStore`] for tests
//! and non-durable use.

pub mod documents;
pub mod file;
pub mod memory;

pub use documents::{
    ADMIN_COMMANDS_KEY, ALLOWED_GROUPS_KEY, AdminCommandsDocument, AllowedGroupsDocument,
    DOCUMENT_VERSION, MAINTENANCE_KEY, MaintenanceDocument, QUEUE_KEY, QueueDocument,
    STATIONS_KEY, StationsDocument, load_document, save_document,
};
pub use file::FileStore;
pub use memory::MemoryStore;
