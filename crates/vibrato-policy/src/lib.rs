// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin/policy gate for the Vibrato playback coordinator.
//!
//! Authorizes each command against role, admin allow-list, maintenance
//! flag, and group allow-list -- in that order, failing closed whenever
//! the platform cannot answer a role lookup.

pub mod gate;

pub use gate::PolicyGate;
