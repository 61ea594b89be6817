// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Vibrato.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Vibrato configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; the owner id must be set before the coordinator will start.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VibratoConfig {
    /// Bot identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Bot owner identity.
    #[serde(default)]
    pub owner: OwnerConfig,

    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "vibrato".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Bot owner identity configuration.
///
/// The owner bypasses maintenance mode and is the only user allowed to run
/// owner-scoped commands. A zero value means "unset" and fails startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerConfig {
    /// Platform user id of the bot owner.
    #[serde(default)]
    pub user_id: i64,
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding one JSON document per logical key.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Interval of the background session flush, in seconds.
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            flush_interval_secs: default_flush_interval_secs(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("vibrato"))
        .unwrap_or_else(|| std::path::PathBuf::from("vibrato-data"))
        .to_string_lossy()
        .into_owned()
}

fn default_flush_interval_secs() -> u64 {
    120
}
