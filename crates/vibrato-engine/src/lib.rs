// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue engine for the Vibrato playback coordinator.
//!
//! Pairs ordered enqueue/stop operations over a chat's playlist with
//! exclusive acquisition of the call resource, resolving queries through
//! the lookup cache and authorizing everything through the policy gate.

pub mod engine;
pub mod media;
pub mod resolve;

pub use engine::{EngineStats, QueueEngine};
pub use resolve::CachedLookup;
