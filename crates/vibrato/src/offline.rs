// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline stand-in collaborators for the interactive shell.
//!
//! The real chat platform, resolvers, and voice transport are external
//! services; the shell substitutes deterministic local implementations so
//! the whole pipeline can be exercised without network access.

use std::collections::HashSet;

use async_trait::async_trait;
use colored::Colorize;
use tokio::sync::Mutex;
use tracing::info;

use vibrato_core::traits::{
    CallTransport, MediaResolver, MetadataResolver, Notifier, RoleProvider,
};
use vibrato_core::{
    ChatId, MediaInfo, MemberRole, NowPlaying, SongMetadata, UserId, VibratoError,
};

/// Derives song metadata directly from the query text.
pub struct OfflineMetadataResolver;

#[async_trait]
impl MetadataResolver for OfflineMetadataResolver {
    async fn lookup(&self, query: &str) -> Result<Option<SongMetadata>, VibratoError> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(SongMetadata {
            title: query.trim().to_string(),
            artist: "Unknown Artist".to_string(),
            url: format!("https://music.local/{}", slug(query)),
        }))
    }
}

/// Derives a playable stream locator and a stable pseudo-duration from the
/// query text.
pub struct OfflineMediaResolver;

#[async_trait]
impl MediaResolver for OfflineMediaResolver {
    async fn search(&self, query: &str) -> Result<Option<MediaInfo>, VibratoError> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(MediaInfo {
            source_url: format!("https://stream.local/{}", slug(query)),
            title: query.trim().to_string(),
            external_id: format!("loc{}", pseudo_hash(query) % 100_000),
            duration_secs: pseudo_duration(query),
        }))
    }

    async fn resolve_url(&self, url: &str) -> Result<Option<MediaInfo>, VibratoError> {
        if url.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(MediaInfo {
            source_url: url.trim().to_string(),
            title: format!("Video {}", slug(url)),
            external_id: format!("loc{}", pseudo_hash(url) % 100_000),
            duration_secs: pseudo_duration(url),
        }))
    }
}

/// Logs joins and leaves instead of binding a real voice channel.
#[derive(Default)]
pub struct LoggingTransport {
    active: Mutex<HashSet<i64>>,
}

#[async_trait]
impl CallTransport for LoggingTransport {
    async fn join(&self, chat: ChatId, stream_url: &str) -> Result<(), VibratoError> {
        self.active.lock().await.insert(chat.0);
        info!(%chat, stream_url, "call joined");
        Ok(())
    }

    async fn leave(&self, chat: ChatId) -> Result<(), VibratoError> {
        self.active.lock().await.remove(&chat.0);
        info!(%chat, "call left");
        Ok(())
    }
}

/// Prints now-playing notices to the terminal.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn now_playing(&self, notice: &NowPlaying) -> Result<(), VibratoError> {
        let mut line = format!("Now playing: {}", notice.title.bold());
        if let Some(link) = &notice.link {
            line.push_str(&format!(" ({link})"));
        }
        println!("{line}");
        Ok(())
    }
}

/// The shell user owns the shell chat.
pub struct ShellRoles;

#[async_trait]
impl RoleProvider for ShellRoles {
    async fn member_role(&self, _: ChatId, _: UserId) -> Result<MemberRole, VibratoError> {
        Ok(MemberRole::Creator)
    }
}

fn slug(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Small stable string hash; keeps offline results deterministic per query.
fn pseudo_hash(text: &str) -> u64 {
    text.bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

/// A duration between 60s and 360s, always under the song ceiling.
fn pseudo_duration(text: &str) -> u64 {
    60 + pseudo_hash(text) % 300
}
