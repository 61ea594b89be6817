// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock metadata and media resolvers for deterministic testing.
//!
//! Both resolvers derive stable answers from the query text, support an
//! injectable latency (to widen race windows), a no-results mode, and a
//! hard-failure mode.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use vibrato_core::traits::{MediaResolver, MetadataResolver};
use vibrato_core::{MediaInfo, SongMetadata, VibratoError};

/// Mock metadata lookup service.
///
/// Answers every query with `title = query`, `artist = "Artist"` unless
/// switched into no-results or failure mode.
#[derive(Default)]
pub struct MockMetadataResolver {
    latency: Option<Duration>,
    no_results: AtomicBool,
    fail: AtomicBool,
    lookups: AtomicUsize,
}

impl MockMetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency`, widening race windows in tests.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Make every lookup answer "nothing found".
    pub fn set_no_results(&self, on: bool) {
        self.no_results.store(on, Ordering::SeqCst);
    }

    /// Make every lookup fail outright.
    pub fn set_fail(&self, on: bool) {
        self.fail.store(on, Ordering::SeqCst);
    }

    /// Number of lookups that reached this resolver (cache misses).
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataResolver for MockMetadataResolver {
    async fn lookup(&self, query: &str) -> Result<Option<SongMetadata>, VibratoError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(VibratoError::Internal("metadata service offline".into()));
        }
        if self.no_results.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(SongMetadata {
            title: query.to_string(),
            artist: "Artist".to_string(),
            url: format!("https://music.example/{}", slug(query)),
        }))
    }
}

/// Mock media resolver with configurable track durations.
pub struct MockMediaResolver {
    search_duration_secs: u64,
    url_duration_secs: u64,
    no_results: AtomicBool,
    fail: AtomicBool,
    searches: AtomicUsize,
}

impl MockMediaResolver {
    /// `search_duration_secs` applies to search results (songs);
    /// `url_duration_secs` applies to direct-URL resolution (videos).
    pub fn new(search_duration_secs: u64, url_duration_secs: u64) -> Self {
        Self {
            search_duration_secs,
            url_duration_secs,
            no_results: AtomicBool::new(false),
            fail: AtomicBool::new(false),
            searches: AtomicUsize::new(0),
        }
    }

    pub fn set_no_results(&self, on: bool) {
        self.no_results.store(on, Ordering::SeqCst);
    }

    pub fn set_fail(&self, on: bool) {
        self.fail.store(on, Ordering::SeqCst);
    }

    /// Number of searches that reached this resolver (cache misses).
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<bool, VibratoError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VibratoError::Internal("media backend offline".into()));
        }
        Ok(self.no_results.load(Ordering::SeqCst))
    }
}

impl Default for MockMediaResolver {
    fn default() -> Self {
        Self::new(200, 3600)
    }
}

#[async_trait]
impl MediaResolver for MockMediaResolver {
    async fn search(&self, query: &str) -> Result<Option<MediaInfo>, VibratoError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.check()? {
            return Ok(None);
        }
        Ok(Some(MediaInfo {
            source_url: format!("https://stream.example/{}", slug(query)),
            title: query.to_string(),
            external_id: format!("vid-{}", slug(query)),
            duration_secs: self.search_duration_secs,
        }))
    }

    async fn resolve_url(&self, url: &str) -> Result<Option<MediaInfo>, VibratoError> {
        if self.check()? {
            return Ok(None);
        }
        Ok(Some(MediaInfo {
            source_url: url.to_string(),
            title: "Direct Video".to_string(),
            external_id: format!("direct-{}", slug(url)),
            duration_secs: self.url_duration_secs,
        }))
    }
}

fn slug(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
