// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Everything the coordinator core does not own -- the chat platform, the
//! media and metadata resolvers, the voice transport, message delivery,
//! and durable storage -- is reached through a trait defined here.

pub mod notify;
pub mod resolver;
pub mod roles;
pub mod store;
pub mod transport;

pub use notify::Notifier;
pub use resolver::{MediaResolver, MetadataResolver};
pub use roles::RoleProvider;
pub use store::DocumentStore;
pub use transport::CallTransport;
