// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vibrato shell` command implementation.
//!
//! Launches an interactive REPL that drives the full coordinator pipeline
//! -- policy gate, lookup cache, queue engine, session registry, flush
//! task -- with offline stand-in collaborators. The shell user acts as
//! the owner in a private chat whose id equals the owner id.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vibrato_cache::LookupCache;
use vibrato_config::VibratoConfig;
use vibrato_core::{ChatId, ChatKind, UserId, VibratoError};
use vibrato_engine::{CachedLookup, QueueEngine};
use vibrato_policy::PolicyGate;
use vibrato_registry::{FlushTask, SessionRegistry};
use vibrato_store::FileStore;

use crate::dispatch::{CommandRequest, Dispatcher};
use crate::offline::{
    ConsoleNotifier, LoggingTransport, OfflineMediaResolver, OfflineMetadataResolver,
    ShellRoles,
};

/// Runs the `vibrato shell` interactive REPL.
///
/// Builds the full stack over the configured data directory, restores
/// persisted state, and dispatches each input line as a command from the
/// owner. Startup failures here are unrecoverable and propagate out.
pub async fn run_shell(config: VibratoConfig) -> Result<(), VibratoError> {
    if config.owner.user_id == 0 {
        eprintln!(
            "error: owner.user_id is not set. Add it to vibrato.toml or set VIBRATO_OWNER_USER_ID."
        );
        return Err(VibratoError::Config("owner.user_id is not set".into()));
    }
    let owner = UserId(config.owner.user_id);
    let chat = ChatId(config.owner.user_id);

    // Durable store + registry, restoring any persisted queues.
    let store = Arc::new(FileStore::open(&config.storage.data_dir).await?);
    let registry = Arc::new(SessionRegistry::new(store.clone()));
    let restored = registry.load().await;

    let policy = Arc::new(PolicyGate::new(owner, Arc::new(ShellRoles), store.clone()));
    policy.load().await;

    let lookup = CachedLookup::new(
        LookupCache::new(store.clone()),
        Arc::new(OfflineMetadataResolver),
        Arc::new(OfflineMediaResolver),
    );

    let engine = Arc::new(QueueEngine::new(
        registry.clone(),
        policy.clone(),
        lookup,
        Arc::new(LoggingTransport::default()),
        Arc::new(ConsoleNotifier),
        store.clone(),
    ));
    let dispatcher = Dispatcher::new(engine, policy);

    // Background flush, cancelled on exit.
    let cancel = CancellationToken::new();
    let flush = FlushTask::new(
        registry.clone(),
        Duration::from_secs(config.storage.flush_interval_secs),
        cancel.clone(),
    )
    .spawn();

    info!(
        data_dir = config.storage.data_dir.as_str(),
        restored, "shell session starting"
    );

    let mut rl = DefaultEditor::new()
        .map_err(|e| VibratoError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "vibrato shell".bold().green());
    println!(
        "Acting as owner {owner} in chat {chat}. Type {} for commands, {} to exit.\n",
        ".help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let request = CommandRequest {
                    chat_id: chat,
                    chat_kind: ChatKind::Private,
                    user_id: owner,
                    text: trimmed.to_string(),
                };
                let response = dispatcher.dispatch(&request).await;
                println!("{response}");
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                // Ctrl+C / Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    // Stop the flush task; its cancellation path runs one final persist.
    cancel.cancel();
    if let Err(e) = flush.await {
        warn!(error = %e, "flush task did not shut down cleanly");
    }

    println!("Goodbye.");
    Ok(())
}
