// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock call transport recording every acquire and release.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use vibrato_core::traits::CallTransport;
use vibrato_core::{ChatId, VibratoError};

/// Records joins and leaves so tests can assert the exactly-once
/// acquisition property.
#[derive(Default)]
pub struct MockCallTransport {
    joins: AtomicUsize,
    leaves: AtomicUsize,
    active: Mutex<HashSet<i64>>,
    fail_joins: AtomicBool,
}

impl MockCallTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total joins ever attempted (including failed ones).
    pub fn join_count(&self) -> usize {
        self.joins.load(Ordering::SeqCst)
    }

    pub fn leave_count(&self) -> usize {
        self.leaves.load(Ordering::SeqCst)
    }

    /// Whether the resource is currently bound to `chat`.
    pub async fn is_active(&self, chat: ChatId) -> bool {
        self.active.lock().await.contains(&chat.0)
    }

    /// Make every join fail until cleared.
    pub fn set_fail_joins(&self, on: bool) {
        self.fail_joins.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl CallTransport for MockCallTransport {
    async fn join(&self, chat: ChatId, _stream_url: &str) -> Result<(), VibratoError> {
        self.joins.fetch_add(1, Ordering::SeqCst);
        if self.fail_joins.load(Ordering::SeqCst) {
            return Err(VibratoError::Internal("voice transport offline".into()));
        }
        let mut active = self.active.lock().await;
        // The engine contract says this can't happen; surface it loudly if
        // it ever does.
        if !active.insert(chat.0) {
            return Err(VibratoError::Internal(format!(
                "double acquire for chat {chat}"
            )));
        }
        Ok(())
    }

    async fn leave(&self, chat: ChatId) -> Result<(), VibratoError> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        // Tolerates "already released".
        self.active.lock().await.remove(&chat.0);
        Ok(())
    }
}
