// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache key construction: resolver namespace + normalized query.

use strum::{Display, EnumString};

/// Namespace of a cached lookup. Two resolver types never collide in key
/// space because the kind prefixes every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResolverKind {
    /// Media resolver (search string -> playable stream).
    Media,
    /// Metadata lookup service (query -> title/artist).
    Metadata,
}

/// Prefix under which all cache documents live in the store.
const KEY_PREFIX: &str = "cache";

/// Normalize a query for cache-key purposes: trim, lowercase, collapse
/// runs of whitespace to single spaces.
///
/// Normalization only affects keying; the query sent to the resolver is
/// the caller's original text.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the store key for a `(kind, query)` pair.
pub fn cache_key(kind: ResolverKind, query: &str) -> String {
    format!("{KEY_PREFIX}/{kind}:{}", normalize_query(query))
}
