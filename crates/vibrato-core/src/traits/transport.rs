// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voice/audio transport trait -- the exclusive playback resource.

use async_trait::async_trait;

use crate::error::VibratoError;
use crate::types::ChatId;

/// The single exclusive streaming channel bound to one chat at a time.
///
/// The engine guarantees it never calls `join` for a chat that already
/// holds the resource (the check-acquire-set sequence runs under the
/// per-chat session lock). Implementations of `leave` must tolerate
/// "already released" without faulting.
#[async_trait]
pub trait CallTransport: Send + Sync {
    /// Bind the playback resource to `chat` and start streaming `stream_url`.
    async fn join(&self, chat: ChatId, stream_url: &str) -> Result<(), VibratoError>;

    /// Release the playback resource held for `chat`. Idempotent.
    async fn leave(&self, chat: ChatId) -> Result<(), VibratoError>;
}
