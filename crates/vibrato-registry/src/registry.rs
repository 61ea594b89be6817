// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session registry: single in-memory source of truth for all chats.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use vibrato_core::traits::DocumentStore;
use vibrato_core::{ChatId, VibratoError};
use vibrato_store::{QUEUE_KEY, QueueDocument, load_document, save_document};

use crate::session::Session;

/// Owns every [`Session`] and mirrors them to the durable store.
///
/// Each chat gets its own lock; locking chat A never blocks chat B. All
/// mutation happens through the guard returned by [`lock`](Self::lock),
/// and callers never hold a raw reference to session internals across a
/// suspension point.
pub struct SessionRegistry {
    sessions: DashMap<ChatId, Arc<Mutex<Session>>>,
    store: Arc<dyn DocumentStore>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
        }
    }

    fn slot(&self, chat: ChatId) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(chat)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(chat))))
            .clone()
    }

    /// Acquire the exclusive per-chat lock, creating an empty session on
    /// first access.
    ///
    /// The guard may be held across awaits; that is what linearizes the
    /// check-acquire-set sequence on the call resource.
    pub async fn lock(&self, chat: ChatId) -> OwnedMutexGuard<Session> {
        self.slot(chat).lock_owned().await
    }

    /// Read the chat's current epoch without retaining the lock.
    pub async fn epoch(&self, chat: ChatId) -> u64 {
        self.slot(chat).lock().await.epoch
    }

    /// Number of chats currently tracked (including idle ones).
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of chats with an active call right now.
    pub async fn active_call_count(&self) -> usize {
        let slots: Vec<_> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let mut active = 0;
        for slot in slots {
            if slot.lock().await.call_active {
                active += 1;
            }
        }
        active
    }

    /// Restore queues from the durable store. Returns the number of chats
    /// restored. Call flags are not restored: the playback resource never
    /// survives a restart.
    pub async fn load(&self) -> usize {
        let doc: QueueDocument = load_document(self.store.as_ref(), QUEUE_KEY).await;
        let mut restored = 0;
        for (chat_key, tracks) in doc.chats {
            let Ok(id) = chat_key.parse::<i64>() else {
                debug!(chat_key, "skipping unparseable chat key in queue document");
                continue;
            };
            let slot = self.slot(ChatId(id));
            let mut session = slot.lock().await;
            session.queue = tracks;
            restored += 1;
        }
        if restored > 0 {
            info!(chats = restored, "restored session queues from store");
        }
        restored
    }

    /// Snapshot every non-empty session into the queue document and save
    /// it. Chats in their idle state are omitted, which is how a stopped
    /// chat disappears from disk.
    pub async fn persist(&self) -> Result<(), VibratoError> {
        // Collect the slots first: a DashMap iterator must not be held
        // across an await.
        let slots: Vec<(ChatId, Arc<Mutex<Session>>)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut doc = QueueDocument::default();
        for (chat, slot) in slots {
            let session = slot.lock().await;
            if session.is_empty() {
                continue;
            }
            doc.chats.insert(chat.to_string(), session.queue.clone());
        }

        save_document(self.store.as_ref(), QUEUE_KEY, &doc).await?;
        debug!(chats = doc.chats.len(), "session queues persisted");
        Ok(())
    }
}
