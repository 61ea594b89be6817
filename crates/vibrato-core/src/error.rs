// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vibrato playback coordinator.

use thiserror::Error;

use crate::types::TrackKind;

/// The primary error type used across all Vibrato crates.
///
/// Every rejection a command can produce maps to exactly one variant here;
/// the presentation boundary renders these into human-readable status
/// strings, and nothing below that boundary ever formats user-facing text.
#[derive(Debug, Error)]
pub enum VibratoError {
    /// Policy denial: the user may not run this command in this chat.
    #[error("user is not authorized for this command")]
    Unauthorized,

    /// Maintenance mode is active and the user is not the owner.
    #[error("maintenance mode is active")]
    MaintenanceActive,

    /// The chat is a group that is not on the allowed-groups list.
    #[error("chat is not on the allowed-groups list")]
    NotAllowedGroup,

    /// A resolver returned no results for the query.
    #[error("no results found")]
    NoResults,

    /// The resolved track exceeds the duration ceiling for its kind.
    #[error("{kind} duration {duration_secs}s exceeds the {max_secs}s ceiling")]
    TooLong {
        kind: TrackKind,
        duration_secs: u64,
        max_secs: u64,
    },

    /// A collaborator failed while resolving a query (I/O, parse, timeout).
    #[error("resolution failed: {message}")]
    ResolutionFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A durable-store write failed. Non-fatal: in-memory state remains
    /// authoritative and a later flush retries.
    #[error("persistence failed: {source}")]
    PersistenceFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Expand/collapse requested on a session with no expandable payload.
    #[error("no expandable content")]
    NoContent,

    /// The session was cleared (stop) while a resolution was in flight;
    /// the late result was discarded instead of being enqueued.
    #[error("session was cleared while the request was resolving")]
    Superseded,

    /// An admin-command name outside the closed set of known commands.
    #[error("unknown admin command `{name}`")]
    UnknownAdminCommand { name: String },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VibratoError {
    /// Wrap a store error as a `PersistenceFailed`.
    pub fn persistence(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        VibratoError::PersistenceFailed {
            source: Box::new(source),
        }
    }
}
