// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across the Vibrato workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::VibratoError;

/// Stable identifier of a chat (group or private conversation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a chat is a private conversation or a broadcast-style group.
///
/// Group chats are additionally gated by the allowed-groups list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
}

/// A user's role in a chat, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Creator,
    Administrator,
    Member,
}

impl MemberRole {
    /// Roles that may run allow-listed admin commands.
    pub fn can_administer(self) -> bool {
        matches!(self, MemberRole::Creator | MemberRole::Administrator)
    }
}

/// The kind of a queued track, with its kind-specific duration ceiling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Song,
    Video,
}

impl TrackKind {
    /// Maximum playable duration for this kind, in seconds.
    ///
    /// Enforced at resolution time, before enqueue; violating tracks are
    /// rejected and never appear in any queue.
    pub fn max_duration_secs(self) -> u64 {
        match self {
            TrackKind::Song => 600,
            TrackKind::Video => 10_800,
        }
    }
}

/// One resolved, playable queue entry. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Playable stream locator handed to the call transport.
    pub source_url: String,
    pub title: String,
    /// Platform-specific identifier used for watch links and thumbnails.
    /// Empty for live streams that have no backing video.
    pub external_id: String,
    pub duration_secs: u64,
    pub kind: TrackKind,
}

/// The closed set of commands that can appear on the admin allow-list.
///
/// The persisted allow-list document stores these as lowercase strings;
/// unknown names are rejected at the boundary via [`AdminCommand::parse`]
/// rather than silently ignored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdminCommand {
    Play,
    Stop,
    Radio,
}

impl AdminCommand {
    /// Parse a user-supplied command name, rejecting anything outside the
    /// closed set.
    pub fn parse(name: &str) -> Result<Self, VibratoError> {
        name.trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| VibratoError::UnknownAdminCommand {
                name: name.trim().to_string(),
            })
    }
}

/// Classification of a command for the policy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Available to any user once maintenance and group gates pass.
    Open,
    /// Requires an administrator/creator role and allow-list membership.
    Admin(AdminCommand),
    /// Restricted to the bot owner.
    Owner,
}

/// Song metadata returned by the external metadata lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    /// Canonical link on the metadata platform.
    pub url: String,
}

/// A playable stream plus metadata, returned by the media resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub source_url: String,
    pub title: String,
    pub external_id: String,
    pub duration_secs: u64,
}

/// Payload of a now-playing notification emitted after a successful enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub chat_id: ChatId,
    pub title: String,
    /// External watch link, when the track has a backing video.
    pub link: Option<String>,
    /// Thumbnail derived deterministically from the external id.
    pub thumbnail_url: Option<String>,
    pub kind: TrackKind,
}
