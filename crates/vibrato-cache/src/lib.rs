// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup cache fronting the slow external resolvers.
//!
//! Maps a normalized `(resolver kind, query)` pair to a previously resolved
//! payload, persisted through a [`DocumentStore`] so hits survive restarts.
//!
//! Documented limitations, kept deliberately:
//! - **No coalescing**: two concurrent lookups for the same key may both
//!   miss and both perform the expensive resolution; the second `put` wins.
//! - **No expiry**: entries are immortal once written. A capacity/TTL
//!   policy would be an explicit interface change, not a silent one.

pub mod key;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use vibrato_core::VibratoError;
use vibrato_core::traits::DocumentStore;

pub use key::{ResolverKind, cache_key, normalize_query};

/// One cached resolver result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The opaque resolved document, exactly as the resolver produced it.
    pub payload: serde_json::Value,
    /// RFC 3339 timestamp of when the entry was written.
    pub stored_at: String,
}

/// Persistence-backed memo of resolver results.
pub struct LookupCache {
    store: Arc<dyn DocumentStore>,
}

impl LookupCache {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Look up a previously resolved payload. `None` is a miss; a miss is
    /// never an error.
    pub async fn get(&self, kind: ResolverKind, query: &str) -> Option<CacheEntry> {
        let key = cache_key(kind, query);
        let value = self.store.load(&key).await?;
        match serde_json::from_value::<CacheEntry>(value) {
            Ok(entry) => {
                debug!(%kind, query, "cache hit");
                Some(entry)
            }
            // An unreadable entry behaves like a miss and will be
            // overwritten by the next put.
            Err(_) => None,
        }
    }

    /// Store a resolved payload for `(kind, query)`.
    ///
    /// Failures are reported so the caller can log them; a failed put only
    /// costs a future re-resolution.
    pub async fn put(
        &self,
        kind: ResolverKind,
        query: &str,
        payload: serde_json::Value,
    ) -> Result<(), VibratoError> {
        let key = cache_key(kind, query);
        let entry = CacheEntry {
            payload,
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        let value = serde_json::to_value(&entry).map_err(VibratoError::persistence)?;
        self.store.save(&key, &value).await?;
        debug!(%kind, query, "cache entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibrato_store::MemoryStore;

    fn cache() -> LookupCache {
        LookupCache::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn put_then_get_returns_payload_byte_for_byte() {
        let cache = cache();
        let payload = serde_json::json!({
            "title": "Alive",
            "artist": "Daft Punk",
            "url": "https://music.example/alive",
        });

        cache
            .put(ResolverKind::Metadata, "daft punk alive", payload.clone())
            .await
            .unwrap();

        let entry = cache
            .get(ResolverKind::Metadata, "daft punk alive")
            .await
            .expect("hit expected");
        assert_eq!(entry.payload, payload);
        assert!(!entry.stored_at.is_empty());
    }

    #[tokio::test]
    async fn get_on_unwritten_key_is_a_miss() {
        let cache = cache();
        assert!(cache.get(ResolverKind::Media, "never seen").await.is_none());
    }

    #[tokio::test]
    async fn hit_across_query_spellings() {
        let cache = cache();
        cache
            .put(ResolverKind::Media, "Daft  Punk Alive", serde_json::json!(1))
            .await
            .unwrap();
        assert!(
            cache
                .get(ResolverKind::Media, "daft punk alive")
                .await
                .is_some()
        );
    }

    #[tokio::test]
    async fn kinds_are_independent() {
        let cache = cache();
        cache
            .put(ResolverKind::Media, "query", serde_json::json!("media"))
            .await
            .unwrap();
        assert!(cache.get(ResolverKind::Metadata, "query").await.is_none());
    }

    #[tokio::test]
    async fn second_put_overwrites() {
        let cache = cache();
        cache
            .put(ResolverKind::Media, "q", serde_json::json!(1))
            .await
            .unwrap();
        cache
            .put(ResolverKind::Media, "q", serde_json::json!(2))
            .await
            .unwrap();
        let entry = cache.get(ResolverKind::Media, "q").await.unwrap();
        assert_eq!(entry.payload, serde_json::json!(2));
    }
}
