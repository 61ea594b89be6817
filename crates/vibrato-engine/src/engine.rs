// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The queue engine: authorized mutation of per-chat playback state.
//!
//! Every operation authorizes through the policy gate, resolves outside
//! any lock, then mutates the session under its per-chat lock. The
//! check-acquire-set sequence on the call resource runs entirely under
//! that lock, so racing enqueues on an idle chat can never double-acquire.
//!
//! Current scope is single-track sessions: the queue is append-only and
//! the call binds on the transition out of idle. Advancing the queue when
//! a track finishes is an external event this engine does not yet drive.

use std::sync::Arc;

use tracing::{debug, info, warn};

use vibrato_core::traits::{CallTransport, DocumentStore, Notifier};
use vibrato_core::{
    AdminCommand, ChatId, ChatKind, CommandClass, NowPlaying, Track, TrackKind, UserId,
    VibratoError,
};
use vibrato_policy::PolicyGate;
use vibrato_registry::{Panel, SessionRegistry};
use vibrato_store::{STATIONS_KEY, StationsDocument, load_document, save_document};

use crate::media::{thumbnail_url, watch_link};
use crate::resolve::CachedLookup;

/// Counters surfaced on the owner panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Chats the registry currently tracks.
    pub sessions: usize,
    /// Chats holding the playback resource right now.
    pub active_calls: usize,
}

/// Coordinates resolution, policy, session mutation, and the call
/// transport for all queue operations.
pub struct QueueEngine {
    registry: Arc<SessionRegistry>,
    policy: Arc<PolicyGate>,
    lookup: CachedLookup,
    transport: Arc<dyn CallTransport>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn DocumentStore>,
}

impl QueueEngine {
    pub fn new(
        registry: Arc<SessionRegistry>,
        policy: Arc<PolicyGate>,
        lookup: CachedLookup,
        transport: Arc<dyn CallTransport>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            registry,
            policy,
            lookup,
            transport,
            notifier,
            store,
        }
    }

    /// Resolve a song query and append it to the chat's queue, acquiring
    /// the call if the chat was idle. Admin command `play`.
    pub async fn enqueue_song(
        &self,
        chat: ChatId,
        chat_kind: ChatKind,
        user: UserId,
        query: &str,
    ) -> Result<Track, VibratoError> {
        self.policy
            .authorize(chat, chat_kind, user, CommandClass::Admin(AdminCommand::Play))
            .await?;

        // Capture the epoch before suspending on resolution: if a stop
        // lands while we wait, the commit below discards this result.
        let epoch = self.registry.epoch(chat).await;
        let info = self.lookup.song(query).await?;

        let track = Track {
            source_url: info.source_url,
            title: info.title,
            external_id: info.external_id,
            duration_secs: info.duration_secs,
            kind: TrackKind::Song,
        };
        check_duration(&track)?;

        self.commit(chat, epoch, track).await
    }

    /// Resolve a direct URL and append it as a video track. Owner only.
    pub async fn enqueue_video(
        &self,
        chat: ChatId,
        chat_kind: ChatKind,
        user: UserId,
        url: &str,
    ) -> Result<Track, VibratoError> {
        self.policy
            .authorize(chat, chat_kind, user, CommandClass::Owner)
            .await?;

        let epoch = self.registry.epoch(chat).await;
        let info = self.lookup.video(url).await?;

        let track = Track {
            source_url: info.source_url,
            title: info.title,
            external_id: info.external_id,
            duration_secs: info.duration_secs,
            kind: TrackKind::Video,
        };
        check_duration(&track)?;

        self.commit(chat, epoch, track).await
    }

    /// Stream a named radio station into the chat. Admin command `radio`.
    ///
    /// Stations are live streams: zero duration, no backing video.
    pub async fn play_radio(
        &self,
        chat: ChatId,
        chat_kind: ChatKind,
        user: UserId,
        station: &str,
    ) -> Result<Track, VibratoError> {
        self.policy
            .authorize(
                chat,
                chat_kind,
                user,
                CommandClass::Admin(AdminCommand::Radio),
            )
            .await?;

        let epoch = self.registry.epoch(chat).await;
        let stations = self.stations().await;
        let Some((name, url)) = stations
            .stations
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(station.trim()))
        else {
            return Err(VibratoError::NoResults);
        };

        let track = Track {
            source_url: url.clone(),
            title: name.clone(),
            external_id: String::new(),
            duration_secs: 0,
            kind: TrackKind::Song,
        };

        self.commit(chat, epoch, track).await
    }

    /// Clear the chat's queue and release the call if held. Admin command
    /// `stop`. Idempotent: stopping an idle chat is a no-op.
    pub async fn stop(
        &self,
        chat: ChatId,
        chat_kind: ChatKind,
        user: UserId,
    ) -> Result<(), VibratoError> {
        self.policy
            .authorize(chat, chat_kind, user, CommandClass::Admin(AdminCommand::Stop))
            .await?;

        let mut session = self.registry.lock(chat).await;
        if session.call_active {
            // Release tolerates "already released"; a failed leave still
            // counts as released so the session can recover.
            if let Err(e) = self.transport.leave(chat).await {
                warn!(%chat, error = %e, "transport leave failed, treating as released");
            }
        }
        session.clear();
        drop(session);

        info!(%chat, "playback stopped");
        self.persist_best_effort().await;
        Ok(())
    }

    /// Expand the session's panel content. `NoContent` when the session
    /// carries nothing expandable.
    pub async fn expand(&self, chat: ChatId) -> Result<String, VibratoError> {
        let mut session = self.registry.lock(chat).await;
        match session.panel.as_mut() {
            Some(panel) => {
                panel.expanded = true;
                Ok(panel.content.clone())
            }
            None => Err(VibratoError::NoContent),
        }
    }

    /// Collapse the session's panel. `NoContent` when there is none.
    pub async fn collapse(&self, chat: ChatId) -> Result<(), VibratoError> {
        let mut session = self.registry.lock(chat).await;
        match session.panel.as_mut() {
            Some(panel) => {
                panel.expanded = false;
                Ok(())
            }
            None => Err(VibratoError::NoContent),
        }
    }

    /// Owner-panel counters.
    pub async fn stats(&self) -> EngineStats {
        EngineStats {
            sessions: self.registry.session_count(),
            active_calls: self.registry.active_call_count().await,
        }
    }

    /// The radio station directory, seeding the shipped defaults on first
    /// use.
    pub async fn stations(&self) -> StationsDocument {
        let doc: StationsDocument = load_document(self.store.as_ref(), STATIONS_KEY).await;
        if !doc.stations.is_empty() {
            return doc;
        }

        let seeded = StationsDocument::seeded();
        if let Err(e) = save_document(self.store.as_ref(), STATIONS_KEY, &seeded).await {
            warn!(error = %e, "station directory seed not persisted");
        }
        seeded
    }

    /// Append `track` under the chat's lock and acquire the call if idle.
    ///
    /// The whole sequence -- epoch check, append, `call_active` check,
    /// transport join, flag set -- holds the per-chat lock, which is what
    /// makes acquisition exactly-once under racing enqueues.
    async fn commit(
        &self,
        chat: ChatId,
        epoch: u64,
        track: Track,
    ) -> Result<Track, VibratoError> {
        let mut session = self.registry.lock(chat).await;

        if session.epoch != epoch {
            debug!(%chat, "session cleared during resolution, discarding track");
            return Err(VibratoError::Superseded);
        }

        session.queue.push(track.clone());

        if !session.call_active {
            match self.transport.join(chat, &track.source_url).await {
                Ok(()) => {
                    session.call_active = true;
                    info!(%chat, title = track.title.as_str(), "call acquired");
                }
                Err(e) => {
                    // The track stays queued and the flag stays false, so a
                    // later enqueue retries the acquire.
                    drop(session);
                    warn!(%chat, error = %e, "transport join failed");
                    self.persist_best_effort().await;
                    return Err(VibratoError::ResolutionFailed {
                        message: "could not join the call".to_string(),
                        source: Some(Box::new(e)),
                    });
                }
            }
        }

        let notice = NowPlaying {
            chat_id: chat,
            title: track.title.clone(),
            link: watch_link(&track.external_id),
            thumbnail_url: thumbnail_url(&track.external_id),
            kind: track.kind,
        };
        session.panel = Some(Panel {
            content: panel_content(&track),
            expanded: false,
        });
        let position = session.queue.len();
        drop(session);

        debug!(%chat, position, title = track.title.as_str(), "track enqueued");
        self.persist_best_effort().await;

        // Delivery is a platform concern; a failed notification never
        // rolls back the enqueue.
        if let Err(e) = self.notifier.now_playing(&notice).await {
            warn!(%chat, error = %e, "now-playing notification failed");
        }

        Ok(track)
    }

    /// Flush-on-mutation. Failures are logged and left to the periodic
    /// flush to retry; in-memory state stays authoritative.
    async fn persist_best_effort(&self) {
        if let Err(e) = self.registry.persist().await {
            warn!(error = %e, "session persist failed, periodic flush will retry");
        }
    }
}

/// Enforce the kind-specific duration ceiling.
fn check_duration(track: &Track) -> Result<(), VibratoError> {
    let max_secs = track.kind.max_duration_secs();
    if track.duration_secs > max_secs {
        return Err(VibratoError::TooLong {
            kind: track.kind,
            duration_secs: track.duration_secs,
            max_secs,
        });
    }
    Ok(())
}

/// Expandable detail block shown behind the now-playing message.
fn panel_content(track: &Track) -> String {
    let duration = if track.duration_secs == 0 {
        "live".to_string()
    } else {
        format!("{}s", track.duration_secs)
    };
    match watch_link(&track.external_id) {
        Some(link) => format!("{} ({duration})\n{link}", track.title),
        None => format!("{} ({duration})", track.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Barrier, Mutex};

    use vibrato_cache::LookupCache;
    use vibrato_core::traits::{
        MediaResolver, MetadataResolver, RoleProvider,
    };
    use vibrato_core::{MediaInfo, MemberRole, SongMetadata};
    use vibrato_store::MemoryStore;

    const OWNER: UserId = UserId(1);
    const ADMIN: UserId = UserId(2);
    const CHAT: ChatId = ChatId(7);

    /// Everyone is an administrator; good enough for engine tests, which
    /// exercise policy separately.
    struct AllAdmins;

    #[async_trait]
    impl RoleProvider for AllAdmins {
        async fn member_role(&self, _: ChatId, _: UserId) -> Result<MemberRole, VibratoError> {
            Ok(MemberRole::Administrator)
        }
    }

    /// Metadata resolver answering every query, optionally parking callers
    /// at a two-phase barrier: phase one announces "resolving", phase two
    /// releases. Lets tests overlap resolutions or interleave a stop.
    struct TestMetadata {
        barrier: Option<Arc<Barrier>>,
    }

    #[async_trait]
    impl MetadataResolver for TestMetadata {
        async fn lookup(&self, query: &str) -> Result<Option<SongMetadata>, VibratoError> {
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
                barrier.wait().await;
            }
            Ok(Some(SongMetadata {
                title: query.to_string(),
                artist: "Artist".to_string(),
                url: format!("https://music.example/{query}"),
            }))
        }
    }

    /// Media resolver with a configurable duration and call counter.
    struct TestMedia {
        duration_secs: u64,
        searches: AtomicUsize,
    }

    impl TestMedia {
        fn with_duration(duration_secs: u64) -> Self {
            Self {
                duration_secs,
                searches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MediaResolver for TestMedia {
        async fn search(&self, query: &str) -> Result<Option<MediaInfo>, VibratoError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(Some(MediaInfo {
                source_url: format!("https://stream.example/{query}"),
                title: query.to_string(),
                external_id: "vid01".to_string(),
                duration_secs: self.duration_secs,
            }))
        }

        async fn resolve_url(&self, url: &str) -> Result<Option<MediaInfo>, VibratoError> {
            Ok(Some(MediaInfo {
                source_url: url.to_string(),
                title: "Direct Video".to_string(),
                external_id: "direct01".to_string(),
                duration_secs: self.duration_secs,
            }))
        }
    }

    /// Transport counting joins and recording active chats.
    #[derive(Default)]
    struct CountingTransport {
        joins: AtomicUsize,
        leaves: AtomicUsize,
    }

    #[async_trait]
    impl CallTransport for CountingTransport {
        async fn join(&self, _chat: ChatId, _url: &str) -> Result<(), VibratoError> {
            self.joins.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn leave(&self, _chat: ChatId) -> Result<(), VibratoError> {
            self.leaves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<NowPlaying>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn now_playing(&self, notice: &NowPlaying) -> Result<(), VibratoError> {
            self.notices.lock().await.push(notice.clone());
            Ok(())
        }
    }

    struct Fixture {
        engine: Arc<QueueEngine>,
        registry: Arc<SessionRegistry>,
        transport: Arc<CountingTransport>,
        notifier: Arc<RecordingNotifier>,
        media: Arc<TestMedia>,
        store: Arc<MemoryStore>,
    }

    async fn fixture(duration_secs: u64, barrier: Option<Arc<Barrier>>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(SessionRegistry::new(store.clone()));
        let policy = Arc::new(PolicyGate::new(OWNER, Arc::new(AllAdmins), store.clone()));
        policy.load().await;
        policy.allow_group(OWNER, CHAT).await.unwrap();
        for cmd in [AdminCommand::Play, AdminCommand::Stop, AdminCommand::Radio] {
            policy.enable_admin_command(OWNER, cmd).await.unwrap();
        }

        let media = Arc::new(TestMedia::with_duration(duration_secs));
        let transport = Arc::new(CountingTransport::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let lookup = CachedLookup::new(
            LookupCache::new(store.clone()),
            Arc::new(TestMetadata { barrier }),
            media.clone(),
        );

        let engine = Arc::new(QueueEngine::new(
            registry.clone(),
            policy,
            lookup,
            transport.clone(),
            notifier.clone(),
            store.clone(),
        ));

        Fixture {
            engine,
            registry,
            transport,
            notifier,
            media,
            store,
        }
    }

    #[tokio::test]
    async fn enqueue_song_appends_acquires_and_notifies() {
        let fx = fixture(200, None).await;
        let track = fx
            .engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "test song")
            .await
            .unwrap();

        assert_eq!(track.kind, TrackKind::Song);
        let session = fx.registry.lock(CHAT).await;
        assert_eq!(session.queue.len(), 1);
        assert!(session.call_active);
        drop(session);

        assert_eq!(fx.transport.joins.load(Ordering::SeqCst), 1);
        let notices = fx.notifier.notices.lock().await;
        assert_eq!(notices.len(), 1);
        assert!(notices[0].thumbnail_url.as_deref().unwrap().contains("vid01"));
    }

    #[tokio::test]
    async fn too_long_song_never_enters_the_queue() {
        let fx = fixture(601, None).await;
        let err = fx
            .engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "a very long song")
            .await
            .unwrap_err();

        assert!(matches!(err, VibratoError::TooLong { max_secs: 600, .. }));
        assert!(fx.registry.lock(CHAT).await.queue.is_empty());
        assert_eq!(fx.transport.joins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_enqueue_on_active_chat_appends_without_reacquire() {
        let fx = fixture(200, None).await;
        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "first")
            .await
            .unwrap();
        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "second")
            .await
            .unwrap();

        let session = fx.registry.lock(CHAT).await;
        assert_eq!(session.queue.len(), 2);
        drop(session);
        assert_eq!(
            fx.transport.joins.load(Ordering::SeqCst),
            1,
            "never double-acquire while active"
        );
    }

    #[tokio::test]
    async fn racing_enqueues_on_idle_chat_acquire_exactly_once() {
        // Both tasks rendezvous inside the resolver, so both pass the
        // idle check window together before either can commit.
        let barrier = Arc::new(Barrier::new(2));
        let fx = fixture(200, Some(barrier)).await;

        let a = {
            let engine = fx.engine.clone();
            tokio::spawn(async move {
                engine
                    .enqueue_song(ChatId(9), ChatKind::Private, ADMIN, "left")
                    .await
            })
        };
        let b = {
            let engine = fx.engine.clone();
            tokio::spawn(async move {
                engine
                    .enqueue_song(ChatId(9), ChatKind::Private, ADMIN, "right")
                    .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(
            fx.transport.joins.load(Ordering::SeqCst),
            1,
            "the per-chat lock must serialize check-acquire-set"
        );
        assert_eq!(fx.registry.lock(ChatId(9)).await.queue.len(), 2);
    }

    #[tokio::test]
    async fn stop_clears_releases_and_is_idempotent() {
        let fx = fixture(200, None).await;
        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "song")
            .await
            .unwrap();

        fx.engine.stop(CHAT, ChatKind::Group, ADMIN).await.unwrap();
        {
            let session = fx.registry.lock(CHAT).await;
            assert!(session.queue.is_empty());
            assert!(!session.call_active);
        }
        assert_eq!(fx.transport.leaves.load(Ordering::SeqCst), 1);

        // Second stop: still fine, no second leave.
        fx.engine.stop(CHAT, ChatKind::Group, ADMIN).await.unwrap();
        assert_eq!(fx.transport.leaves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_during_resolution_discards_the_late_track() {
        let barrier = Arc::new(Barrier::new(2));
        let fx = fixture(200, Some(barrier.clone())).await;

        let pending = {
            let engine = fx.engine.clone();
            tokio::spawn(async move {
                engine
                    .enqueue_song(CHAT, ChatKind::Group, ADMIN, "slow song")
                    .await
            })
        };

        // Phase one: the enqueue is parked inside the resolver. Stop the
        // session, then release it through phase two.
        barrier.wait().await;
        fx.engine.stop(CHAT, ChatKind::Group, ADMIN).await.unwrap();
        barrier.wait().await;

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, VibratoError::Superseded));

        let session = fx.registry.lock(CHAT).await;
        assert!(session.queue.is_empty(), "late track must not resurrect");
        assert!(!session.call_active);
        drop(session);
        assert_eq!(fx.transport.joins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn owner_only_video_respects_ceiling() {
        let fx = fixture(10_801, None).await;
        let err = fx
            .engine
            .enqueue_video(ChatId(42), ChatKind::Private, OWNER, "https://example/vid")
            .await
            .unwrap_err();

        assert!(matches!(err, VibratoError::TooLong { max_secs: 10_800, .. }));
        assert!(fx.registry.lock(ChatId(42)).await.queue.is_empty());
        assert_eq!(fx.transport.joins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn video_is_rejected_for_non_owners() {
        let fx = fixture(100, None).await;
        let err = fx
            .engine
            .enqueue_video(CHAT, ChatKind::Group, ADMIN, "https://example/vid")
            .await
            .unwrap_err();
        assert!(matches!(err, VibratoError::Unauthorized));
    }

    #[tokio::test]
    async fn repeated_query_hits_the_cache() {
        let fx = fixture(200, None).await;
        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "cached song")
            .await
            .unwrap();
        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "cached song")
            .await
            .unwrap();

        assert_eq!(
            fx.media.searches.load(Ordering::SeqCst),
            1,
            "second resolution must come from the cache"
        );
    }

    #[tokio::test]
    async fn persistence_failure_never_aborts_an_enqueue() {
        let fx = fixture(200, None).await;
        fx.store.set_fail_writes(true);

        // Cache writes and queue persists both fail; the enqueue still
        // succeeds and memory stays authoritative.
        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "song")
            .await
            .unwrap();
        assert_eq!(fx.registry.lock(CHAT).await.queue.len(), 1);
    }

    #[tokio::test]
    async fn expand_and_collapse_toggle_the_panel() {
        let fx = fixture(200, None).await;

        // Nothing queued yet: no content either way.
        assert!(matches!(
            fx.engine.expand(CHAT).await.unwrap_err(),
            VibratoError::NoContent
        ));
        assert!(matches!(
            fx.engine.collapse(CHAT).await.unwrap_err(),
            VibratoError::NoContent
        ));

        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "song")
            .await
            .unwrap();

        let content = fx.engine.expand(CHAT).await.unwrap();
        assert!(content.contains("song"));
        fx.engine.collapse(CHAT).await.unwrap();
    }

    #[tokio::test]
    async fn radio_streams_a_seeded_station() {
        let fx = fixture(200, None).await;
        let track = fx
            .engine
            .play_radio(CHAT, ChatKind::Group, ADMIN, "red fm")
            .await
            .unwrap();

        assert_eq!(track.duration_secs, 0);
        assert!(track.external_id.is_empty());
        assert!(fx.registry.lock(CHAT).await.call_active);

        let err = fx
            .engine
            .play_radio(CHAT, ChatKind::Group, ADMIN, "no such station")
            .await
            .unwrap_err();
        assert!(matches!(err, VibratoError::NoResults));
    }

    #[tokio::test]
    async fn stats_reflect_sessions_and_calls() {
        let fx = fixture(200, None).await;
        fx.engine
            .enqueue_song(CHAT, ChatKind::Group, ADMIN, "song")
            .await
            .unwrap();
        fx.registry.lock(ChatId(8)).await; // idle session

        let stats = fx.engine.stats().await;
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.active_calls, 1);
    }
}
