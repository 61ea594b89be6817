// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vibrato integration tests.
//!
//! Provides mock collaborators and harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockMetadataResolver`] / [`MockMediaResolver`] - deterministic
//!   resolvers with latency, no-results, and failure modes
//! - [`MockCallTransport`] - acquire/release recorder for the
//!   exactly-once acquisition property
//! - [`MockRoleProvider`] / [`RecordingNotifier`] - platform stand-ins
//! - [`TestHarness`] - a fully wired coordinator stack over a memory store

pub mod harness;
pub mod mock_platform;
pub mod mock_resolvers;
pub mod mock_transport;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_platform::{MockRoleProvider, RecordingNotifier};
pub use mock_resolvers::{MockMediaResolver, MockMetadataResolver};
pub use mock_transport::MockCallTransport;
