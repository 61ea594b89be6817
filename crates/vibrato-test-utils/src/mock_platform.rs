// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat-platform collaborators: role lookup and notifications.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use vibrato_core::traits::{Notifier, RoleProvider};
use vibrato_core::{ChatId, MemberRole, NowPlaying, UserId, VibratoError};

/// Role provider with preset per-chat roles and an injectable failure
/// (for fail-closed tests). Users without a preset are plain members.
#[derive(Default)]
pub struct MockRoleProvider {
    roles: Mutex<HashMap<(i64, i64), MemberRole>>,
    fail: AtomicBool,
}

impl MockRoleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_role(&self, chat: ChatId, user: UserId, role: MemberRole) {
        self.roles.lock().await.insert((chat.0, user.0), role);
    }

    /// Make every lookup fail until cleared.
    pub fn set_fail(&self, on: bool) {
        self.fail.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl RoleProvider for MockRoleProvider {
    async fn member_role(&self, chat: ChatId, user: UserId) -> Result<MemberRole, VibratoError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VibratoError::Internal("member lookup offline".into()));
        }
        Ok(self
            .roles
            .lock()
            .await
            .get(&(chat.0, user.0))
            .copied()
            .unwrap_or(MemberRole::Member))
    }
}

/// Notifier capturing every now-playing notice for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<NowPlaying>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notices(&self) -> Vec<NowPlaying> {
        self.notices.lock().await.clone()
    }

    pub async fn notice_count(&self) -> usize {
        self.notices.lock().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn now_playing(&self, notice: &NowPlaying) -> Result<(), VibratoError> {
        self.notices.lock().await.push(notice.clone());
        Ok(())
    }
}
