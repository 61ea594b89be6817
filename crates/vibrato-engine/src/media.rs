// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic derivation of watch links and thumbnails from external ids.

/// Thumbnail URL for a track's backing video, if it has one.
pub fn thumbnail_url(external_id: &str) -> Option<String> {
    if external_id.is_empty() {
        return None;
    }
    Some(format!(
        "https://img.youtube.com/vi/{external_id}/maxresdefault.jpg"
    ))
}

/// Short watch link for a track's backing video, if it has one.
pub fn watch_link(external_id: &str) -> Option<String> {
    if external_id.is_empty() {
        return None;
    }
    Some(format!("https://youtu.be/{external_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_derive_from_external_id() {
        assert_eq!(
            thumbnail_url("abc123").as_deref(),
            Some("https://img.youtube.com/vi/abc123/maxresdefault.jpg")
        );
        assert_eq!(
            watch_link("abc123").as_deref(),
            Some("https://youtu.be/abc123")
        );
    }

    #[test]
    fn empty_id_has_no_links() {
        // Live streams carry no backing video.
        assert!(thumbnail_url("").is_none());
        assert!(watch_link("").is_none());
    }
}
