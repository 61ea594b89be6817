// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-fronted resolution against the external backends.
//!
//! Song resolution is a two-step pipeline: the metadata service turns a
//! free-text query into `title`/`artist`, then the media resolver is
//! searched with `"<title> <artist>"`. Both steps memoize successful
//! results in their own cache namespace. Direct-URL resolution (videos)
//! is never cached.

use std::sync::Arc;

use tracing::warn;

use vibrato_cache::{LookupCache, ResolverKind};
use vibrato_core::traits::{MediaResolver, MetadataResolver};
use vibrato_core::{MediaInfo, SongMetadata, VibratoError};

/// Resolver pair behind the lookup cache.
pub struct CachedLookup {
    cache: LookupCache,
    metadata: Arc<dyn MetadataResolver>,
    media: Arc<dyn MediaResolver>,
}

impl CachedLookup {
    pub fn new(
        cache: LookupCache,
        metadata: Arc<dyn MetadataResolver>,
        media: Arc<dyn MediaResolver>,
    ) -> Self {
        Self {
            cache,
            metadata,
            media,
        }
    }

    /// Resolve a free-text song query to a playable stream.
    ///
    /// `NoResults` when either step comes back empty; any collaborator
    /// failure surfaces as `ResolutionFailed`.
    pub async fn song(&self, query: &str) -> Result<MediaInfo, VibratoError> {
        let Some(meta) = self.metadata_lookup(query).await? else {
            return Err(VibratoError::NoResults);
        };

        let search = format!("{} {}", meta.title, meta.artist);
        self.media_search(&search).await?.ok_or(VibratoError::NoResults)
    }

    /// Resolve a direct URL to a playable stream. Not cached.
    pub async fn video(&self, url: &str) -> Result<MediaInfo, VibratoError> {
        self.media
            .resolve_url(url)
            .await
            .map_err(as_resolution_failure)?
            .ok_or(VibratoError::NoResults)
    }

    async fn metadata_lookup(&self, query: &str) -> Result<Option<SongMetadata>, VibratoError> {
        if let Some(entry) = self.cache.get(ResolverKind::Metadata, query).await
            && let Ok(meta) = serde_json::from_value::<SongMetadata>(entry.payload)
        {
            return Ok(Some(meta));
        }

        let resolved = self
            .metadata
            .lookup(query)
            .await
            .map_err(as_resolution_failure)?;

        // Only successful lookups are memoized; empty answers retry next time.
        if let Some(meta) = &resolved {
            self.put_cached(ResolverKind::Metadata, query, meta).await;
        }
        Ok(resolved)
    }

    async fn media_search(&self, query: &str) -> Result<Option<MediaInfo>, VibratoError> {
        if let Some(entry) = self.cache.get(ResolverKind::Media, query).await
            && let Ok(info) = serde_json::from_value::<MediaInfo>(entry.payload)
        {
            return Ok(Some(info));
        }

        let resolved = self
            .media
            .search(query)
            .await
            .map_err(as_resolution_failure)?;

        if let Some(info) = &resolved {
            self.put_cached(ResolverKind::Media, query, info).await;
        }
        Ok(resolved)
    }

    async fn put_cached<T: serde::Serialize>(&self, kind: ResolverKind, query: &str, value: &T) {
        let Ok(payload) = serde_json::to_value(value) else {
            return;
        };
        // A failed put only costs a future re-resolution.
        if let Err(e) = self.cache.put(kind, query, payload).await {
            warn!(%kind, query, error = %e, "cache write failed");
        }
    }
}

/// Collapse arbitrary collaborator errors into `ResolutionFailed` so raw
/// resolver failures never cross the engine boundary.
fn as_resolution_failure(err: VibratoError) -> VibratoError {
    match err {
        VibratoError::ResolutionFailed { .. } | VibratoError::NoResults => err,
        other => VibratoError::ResolutionFailed {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}
