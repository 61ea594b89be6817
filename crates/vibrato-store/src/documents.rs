// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed shapes of the persisted documents, one per logical key.
//!
//! Every document carries a `version` tag so future shape changes can be
//! detected. The read path maps any parse failure to the empty default, so
//! older or foreign documents degrade to defaults instead of erroring.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use vibrato_core::traits::DocumentStore;
use vibrato_core::{Track, VibratoError};

/// Key of the chat -> ordered track list document.
pub const QUEUE_KEY: &str = "queue";
/// Key of the admin-command allow-list document.
pub const ADMIN_COMMANDS_KEY: &str = "admin_commands";
/// Key of the allowed-groups document.
pub const ALLOWED_GROUPS_KEY: &str = "allowed_groups";
/// Key of the maintenance flag document.
pub const MAINTENANCE_KEY: &str = "maintenance_mode";
/// Key of the radio station directory document.
pub const STATIONS_KEY: &str = "fm_channels";

/// Current schema version written into every document.
pub const DOCUMENT_VERSION: u32 = 1;

fn current_version() -> u32 {
    DOCUMENT_VERSION
}

/// Load and deserialize the document under `key`, falling back to the
/// default on absence or any shape mismatch.
pub async fn load_document<T>(store: &dyn DocumentStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.load(key).await {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(key, error = %e, "document shape mismatch, using default");
            T::default()
        }),
        None => T::default(),
    }
}

/// Serialize and save a document under `key`.
pub async fn save_document<T>(
    store: &dyn DocumentStore,
    key: &str,
    document: &T,
) -> Result<(), VibratoError>
where
    T: Serialize,
{
    let value = serde_json::to_value(document).map_err(VibratoError::persistence)?;
    store.save(key, &value).await
}

/// Per-chat ordered playback queues.
///
/// Chats are keyed by their decimal id rendered as a string (JSON object
/// keys are strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub chats: BTreeMap<String, Vec<Track>>,
}

impl Default for QueueDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            chats: BTreeMap::new(),
        }
    }
}

/// The persisted admin-command allow-list.
///
/// Entries are stored as free strings on disk (the historical shape);
/// the policy gate validates each against the closed command set on load
/// and skips anything unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCommandsDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub allowed_admin_commands: BTreeSet<String>,
}

impl Default for AdminCommandsDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            allowed_admin_commands: BTreeSet::new(),
        }
    }
}

/// Chats permitted to use the bot from broadcast-style groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedGroupsDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub chats: BTreeSet<i64>,
}

impl Default for AllowedGroupsDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            chats: BTreeSet::new(),
        }
    }
}

/// Process-wide maintenance flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for MaintenanceDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            enabled: false,
        }
    }
}

/// Radio station directory: station name -> stream URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationsDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub stations: BTreeMap<String, String>,
}

impl Default for StationsDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            stations: BTreeMap::new(),
        }
    }
}

impl StationsDocument {
    /// The directory shipped on first run, before any customization.
    pub fn seeded() -> Self {
        let mut stations = BTreeMap::new();
        stations.insert(
            "Radio Mirchi".to_string(),
            "http://example.com/radiomirchi".to_string(),
        );
        stations.insert("Red FM".to_string(), "http://example.com/redfm".to_string());
        stations.insert("Big FM".to_string(), "http://example.com/bigfm".to_string());
        Self {
            version: DOCUMENT_VERSION,
            stations,
        }
    }

    /// Case-insensitive station lookup.
    pub fn stream_url(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.stations
            .iter()
            .find(|(station, _)| station.eq_ignore_ascii_case(wanted))
            .map(|(_, url)| url.as_str())
    }
}
