// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling a complete coordinator stack with mock
//! collaborators over an in-memory store.
//!
//! Provides direct handles to every subsystem so integration tests can
//! drive the engine and assert against the transport, notifier, store,
//! and registry.

use std::sync::Arc;
use std::time::Duration;

use vibrato_cache::LookupCache;
use vibrato_core::{AdminCommand, ChatId, MemberRole, UserId};
use vibrato_engine::{CachedLookup, QueueEngine};
use vibrato_policy::PolicyGate;
use vibrato_registry::SessionRegistry;
use vibrato_store::MemoryStore;

use crate::mock_platform::{MockRoleProvider, RecordingNotifier};
use crate::mock_resolvers::{MockMediaResolver, MockMetadataResolver};
use crate::mock_transport::MockCallTransport;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    owner: UserId,
    song_duration_secs: u64,
    video_duration_secs: u64,
    resolver_latency: Option<Duration>,
    admins: Vec<(ChatId, UserId)>,
    allowed_groups: Vec<ChatId>,
    enabled_commands: Vec<AdminCommand>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            owner: UserId(1000),
            song_duration_secs: 200,
            video_duration_secs: 3600,
            resolver_latency: None,
            admins: Vec::new(),
            allowed_groups: Vec::new(),
            enabled_commands: vec![AdminCommand::Play, AdminCommand::Stop, AdminCommand::Radio],
        }
    }

    /// Set the bot owner (default `UserId(1000)`).
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = owner;
        self
    }

    /// Duration the media resolver reports for song searches.
    pub fn with_song_duration(mut self, secs: u64) -> Self {
        self.song_duration_secs = secs;
        self
    }

    /// Duration the media resolver reports for direct-URL videos.
    pub fn with_video_duration(mut self, secs: u64) -> Self {
        self.video_duration_secs = secs;
        self
    }

    /// Delay every metadata lookup, widening race windows.
    pub fn with_resolver_latency(mut self, latency: Duration) -> Self {
        self.resolver_latency = Some(latency);
        self
    }

    /// Grant `user` the administrator role in `chat`.
    pub fn with_admin(mut self, chat: ChatId, user: UserId) -> Self {
        self.admins.push((chat, user));
        self
    }

    /// Put `chat` on the allowed-groups list.
    pub fn with_allowed_group(mut self, chat: ChatId) -> Self {
        self.allowed_groups.push(chat);
        self
    }

    /// Replace the default admin allow-list (play, stop, radio).
    pub fn with_enabled_commands(mut self, commands: Vec<AdminCommand>) -> Self {
        self.enabled_commands = commands;
        self
    }

    /// Build the harness, creating all subsystems over a fresh store.
    pub async fn build(self) -> TestHarness {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(SessionRegistry::new(store.clone()));

        let roles = Arc::new(MockRoleProvider::new());
        for (chat, user) in &self.admins {
            roles
                .set_role(*chat, *user, MemberRole::Administrator)
                .await;
        }

        let policy = Arc::new(PolicyGate::new(self.owner, roles.clone(), store.clone()));
        policy.load().await;
        for chat in &self.allowed_groups {
            policy.allow_group(self.owner, *chat).await.expect("owner");
        }
        for command in &self.enabled_commands {
            policy
                .enable_admin_command(self.owner, *command)
                .await
                .expect("owner");
        }

        let metadata = Arc::new(match self.resolver_latency {
            Some(latency) => MockMetadataResolver::with_latency(latency),
            None => MockMetadataResolver::new(),
        });
        let media = Arc::new(MockMediaResolver::new(
            self.song_duration_secs,
            self.video_duration_secs,
        ));
        let lookup = CachedLookup::new(
            LookupCache::new(store.clone()),
            metadata.clone(),
            media.clone(),
        );

        let transport = Arc::new(MockCallTransport::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let engine = Arc::new(QueueEngine::new(
            registry.clone(),
            policy.clone(),
            lookup,
            transport.clone(),
            notifier.clone(),
            store.clone(),
        ));

        TestHarness {
            owner: self.owner,
            engine,
            registry,
            policy,
            roles,
            metadata,
            media,
            transport,
            notifier,
            store,
        }
    }
}

/// A fully wired coordinator stack with handles to every mock.
pub struct TestHarness {
    pub owner: UserId,
    pub engine: Arc<QueueEngine>,
    pub registry: Arc<SessionRegistry>,
    pub policy: Arc<PolicyGate>,
    pub roles: Arc<MockRoleProvider>,
    pub metadata: Arc<MockMetadataResolver>,
    pub media: Arc<MockMediaResolver>,
    pub transport: Arc<MockCallTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Start building a harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
