// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store, the pluggable non-durable backing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use vibrato_core::VibratoError;
use vibrato_core::traits::DocumentStore;

/// A process-local document store backed by a map.
///
/// Used by tests and wherever durability is not required. Supports an
/// injectable write-failure mode so callers' `PersistenceFailed` handling
/// can be exercised.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, serde_json::Value>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail until cleared.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, key: &str) -> Option<serde_json::Value> {
        self.documents.read().await.get(key).cloned()
    }

    async fn save(&self, key: &str, document: &serde_json::Value) -> Result<(), VibratoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(VibratoError::persistence(std::io::Error::other(
                "write failure injected",
            )));
        }
        self.documents
            .write()
            .await
            .insert(key.to_string(), document.clone());
        Ok(())
    }
}
