// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-member role lookup against the chat platform.

use async_trait::async_trait;

use crate::error::VibratoError;
use crate::types::{ChatId, MemberRole, UserId};

/// Reports a user's role within a chat.
///
/// The policy gate treats any lookup failure as a denial (fail-closed), so
/// implementations should return `Err` rather than guessing.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    async fn member_role(&self, chat: ChatId, user: UserId) -> Result<MemberRole, VibratoError>;
}
