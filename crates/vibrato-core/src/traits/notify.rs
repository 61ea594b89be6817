// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notification trait (message delivery is a platform concern).

use async_trait::async_trait;

use crate::error::VibratoError;
use crate::types::NowPlaying;

/// Delivers user-facing notifications through the chat platform.
///
/// Delivery failures are logged by callers and never abort the operation
/// that triggered the notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce the track that just started (or joined the queue).
    async fn now_playing(&self, notice: &NowPlaying) -> Result<(), VibratoError>;
}
