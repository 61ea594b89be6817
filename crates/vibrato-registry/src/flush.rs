// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic background flush of the session registry.
//!
//! Runs on a fixed interval independent of mutation traffic and never
//! blocks foreground command handling: failures are logged and the next
//! tick retries. A crash therefore loses at most one interval of queue
//! mutations, and the store's atomic save keeps the on-disk document
//! intact.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::registry::SessionRegistry;

/// Background task flushing the registry every `interval`.
pub struct FlushTask {
    registry: Arc<SessionRegistry>,
    interval: Duration,
    cancel: CancellationToken,
}

impl FlushTask {
    pub fn new(
        registry: Arc<SessionRegistry>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            interval,
            cancel,
        }
    }

    /// Spawn the flush loop onto the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately; skip it so
        // the first real flush happens one full interval after startup.
        ticker.tick().await;

        info!(interval_secs = self.interval.as_secs(), "flush task running");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.registry.persist().await {
                        Ok(()) => debug!("periodic flush complete"),
                        Err(e) => warn!(error = %e, "periodic flush failed, will retry next tick"),
                    }
                }
                _ = self.cancel.cancelled() => {
                    // Final flush on shutdown so a clean exit loses nothing.
                    if let Err(e) = self.registry.persist().await {
                        warn!(error = %e, "final flush on shutdown failed");
                    }
                    info!("flush task stopped");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibrato_core::{ChatId, DocumentStore, Track, TrackKind};
    use vibrato_store::{MemoryStore, QUEUE_KEY, QueueDocument, load_document};

    /// Let the flush task run through its pending tick.
    async fn drain() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn track() -> Track {
        Track {
            source_url: "https://stream.example/t".into(),
            title: "t".into(),
            external_id: "id".into(),
            duration_secs: 100,
            kind: TrackKind::Song,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn flushes_on_interval() {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(SessionRegistry::new(store.clone()));
        let cancel = CancellationToken::new();

        let handle = FlushTask::new(
            Arc::clone(&registry),
            Duration::from_secs(120),
            cancel.clone(),
        )
        .spawn();

        {
            let mut session = registry.lock(ChatId(1)).await;
            session.queue.push(track());
        }

        // Nothing is written before the first interval elapses.
        tokio::time::advance(Duration::from_secs(60)).await;
        drain().await;
        assert!(store.load(QUEUE_KEY).await.is_none());

        tokio::time::advance(Duration::from_secs(61)).await;
        drain().await;
        let doc: QueueDocument = load_document(store.as_ref(), QUEUE_KEY).await;
        assert!(doc.chats.contains_key("1"));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_triggers_final_flush() {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(SessionRegistry::new(store.clone()));
        let cancel = CancellationToken::new();

        let handle = FlushTask::new(
            Arc::clone(&registry),
            Duration::from_secs(120),
            cancel.clone(),
        )
        .spawn();

        {
            let mut session = registry.lock(ChatId(2)).await;
            session.queue.push(track());
        }

        cancel.cancel();
        handle.await.unwrap();

        let doc: QueueDocument = load_document(store.as_ref(), QUEUE_KEY).await;
        assert!(doc.chats.contains_key("2"), "shutdown must flush once more");
    }

    #[tokio::test(start_paused = true)]
    async fn flush_failure_does_not_kill_the_task() {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(SessionRegistry::new(store.clone()));
        let cancel = CancellationToken::new();

        let handle = FlushTask::new(
            Arc::clone(&registry),
            Duration::from_secs(120),
            cancel.clone(),
        )
        .spawn();

        {
            let mut session = registry.lock(ChatId(3)).await;
            session.queue.push(track());
        }

        // First tick fails; the task must keep running and succeed later.
        store.set_fail_writes(true);
        tokio::time::advance(Duration::from_secs(121)).await;
        drain().await;
        assert!(store.load(QUEUE_KEY).await.is_none());

        store.set_fail_writes(false);
        tokio::time::advance(Duration::from_secs(121)).await;
        drain().await;
        let doc: QueueDocument = load_document(store.as_ref(), QUEUE_KEY).await;
        assert!(doc.chats.contains_key("3"));

        cancel.cancel();
        handle.await.unwrap();
    }
}
