// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat session state.

use vibrato_core::{ChatId, Track};

/// Expandable content attached to the session's currently displayed
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub content: String,
    pub expanded: bool,
}

/// In-memory state of one chat's playback session.
///
/// Owned exclusively by the [`SessionRegistry`](crate::SessionRegistry);
/// callers only ever see it through the per-chat lock guard, so every
/// read-modify-write on a single chat is linearized.
#[derive(Debug)]
pub struct Session {
    pub chat_id: ChatId,
    /// Ordered playback queue; insertion order is significant.
    pub queue: Vec<Track>,
    /// True while the external playback resource is bound to this chat.
    pub call_active: bool,
    /// Generation counter, bumped whenever the session is cleared. An
    /// in-flight resolution captures the epoch before suspending and
    /// discards its result if the epoch moved in the meantime.
    pub epoch: u64,
    /// Expandable now-playing content, if any.
    pub panel: Option<Panel>,
}

impl Session {
    /// A fresh idle session: empty queue, no call, no panel.
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            queue: Vec::new(),
            call_active: false,
            epoch: 0,
            panel: None,
        }
    }

    /// Empty the session: drop the queue and panel, clear the call flag,
    /// and advance the epoch so pending resolutions discard themselves.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.call_active = false;
        self.panel = None;
        self.epoch += 1;
    }

    /// Whether this session carries any state worth persisting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && !self.call_active
    }
}
