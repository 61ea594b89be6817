// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable document store trait for JSON-shaped persistence backends.

use async_trait::async_trait;

use crate::error::VibratoError;

/// Whole-document JSON persistence, one document per logical key.
///
/// Contract:
/// - `load` treats a missing document and malformed content identically as
///   `None`; parse errors never reach callers, who fall back to an empty
///   default.
/// - `save` replaces the whole document (no merge semantics) and is atomic
///   with respect to a concurrent `load` of the same key: no observer may
///   see a partially written document.
/// - `save` failures are reported to the caller; in-memory state remains
///   authoritative until the next successful save.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the document stored under `key`, or `None` if absent or unreadable.
    async fn load(&self, key: &str) -> Option<serde_json::Value>;

    /// Atomically replace the document stored under `key`.
    async fn save(&self, key: &str, document: &serde_json::Value) -> Result<(), VibratoError>;
}
