// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vibrato.toml` > `~/.config/vibrato/vibrato.toml`
//! > `/etc/vibrato/vibrato.toml` with environment variable overrides via the
//! `VIBRATO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VibratoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vibrato/vibrato.toml` (system-wide)
/// 3. `~/.config/vibrato/vibrato.toml` (user XDG config)
/// 4. `./vibrato.toml` (local directory)
/// 5. `VIBRATO_*` environment variables
pub fn load_config() -> Result<VibratoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<VibratoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VibratoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VibratoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VibratoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for
/// diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VibratoConfig::default()))
        .merge(Toml::file("/etc/vibrato/vibrato.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vibrato/vibrato.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vibrato.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VIBRATO_STORAGE_DATA_DIR` must map to
/// `storage.data_dir`, not `storage.data.dir`.
fn env_provider() -> Env {
    Env::prefixed("VIBRATO_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("owner_", "owner.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
