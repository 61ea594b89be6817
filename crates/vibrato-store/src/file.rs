// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed document store: one JSON file per logical key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use vibrato_core::VibratoError;
use vibrato_core::traits::DocumentStore;

/// Maximum length of the human-readable part of a document filename.
const SLUG_MAX_LEN: usize = 40;

/// Stores each document as `<slug>-<digest>.json` under a root directory.
///
/// The slug keeps filenames readable; the 8-hex-char SHA-256 digest of the
/// full key guarantees distinct keys never map to the same file, even when
/// sanitization collapses their slugs.
///
/// Writes go to a uniquely named temp file in the same directory followed
/// by a rename, so a concurrent `load` observes either the old or the new
/// document, never a partial one.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, VibratoError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(VibratoError::persistence)?;
        debug!(root = %root.display(), "file store opened");
        Ok(Self { root })
    }

    /// Directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(file_name_for(key))
    }
}

/// Derive a stable, collision-free filename for a document key.
fn file_name_for(key: &str) -> String {
    let slug: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .take(SLUG_MAX_LEN)
        .collect();

    let digest = Sha256::digest(key.as_bytes());
    let short = hex::encode(&digest[..4]);

    format!("{slug}-{short}.json")
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn load(&self, key: &str) -> Option<serde_json::Value> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "document unreadable, treating as absent");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "document malformed, treating as absent");
                None
            }
        }
    }

    async fn save(&self, key: &str, document: &serde_json::Value) -> Result<(), VibratoError> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(
            ".{}.{}.tmp",
            file_name_for(key),
            uuid::Uuid::new_v4()
        ));

        let bytes = serde_json::to_vec(document).map_err(VibratoError::persistence)?;

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(VibratoError::persistence)?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            // Best effort: don't leave the temp file behind on failure.
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(VibratoError::persistence(e));
        }

        debug!(key, path = %path.display(), "document saved");
        Ok(())
    }
}
