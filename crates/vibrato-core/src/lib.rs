// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vibrato playback coordinator.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Vibrato workspace. External
//! collaborators (chat platform, resolvers, voice transport, storage) are
//! reached only through traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VibratoError;
pub use types::{
    AdminCommand, ChatId, ChatKind, CommandClass, MediaInfo, MemberRole, NowPlaying,
    SongMetadata, Track, TrackKind, UserId,
};

// Re-export all collaborator traits at crate root.
pub use traits::{
    CallTransport, DocumentStore, MediaResolver, MetadataResolver, Notifier, RoleProvider,
};
