// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session registry for the Vibrato playback coordinator.
//!
//! The registry is the single in-memory source of truth for per-chat
//! state. Each chat's [`Session`] sits behind its own async mutex --
//! mutations to one chat are linearized by that chat's lock while
//! different chats proceed fully concurrently. The durable mirror is
//! refreshed eagerly after engine mutations and periodically by the
//! [`FlushTask`].

pub mod flush;
pub mod registry;
pub mod session;

pub use flush::FlushTask;
pub use registry::SessionRegistry;
pub use session::{Panel, Session};
