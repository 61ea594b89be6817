// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolver traits for the external metadata and media backends.
//!
//! Both backends may be slow, may fail, and may be rate-limited. Timeouts
//! are the collaborator's concern; implementations must surface them as
//! errors rather than hanging, and the engine converts every resolver
//! error to `ResolutionFailed`.

use async_trait::async_trait;

use crate::error::VibratoError;
use crate::types::{MediaInfo, SongMetadata};

/// Turns a free-text query into song metadata (title/artist resolution).
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Look up the best-matching song for `query`.
    ///
    /// `Ok(None)` means the service answered but found nothing; `Err` means
    /// the service itself failed.
    async fn lookup(&self, query: &str) -> Result<Option<SongMetadata>, VibratoError>;
}

/// Turns a search string or a direct URL into a playable stream locator
/// plus metadata.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Search the media platform and return the first match, if any.
    async fn search(&self, query: &str) -> Result<Option<MediaInfo>, VibratoError>;

    /// Resolve a direct URL (no search) into a playable stream.
    async fn resolve_url(&self, url: &str) -> Result<Option<MediaInfo>, VibratoError>;
}
