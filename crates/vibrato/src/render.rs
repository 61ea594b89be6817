// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of internal error kinds into user-facing status strings.
//!
//! This is the only place the machine-readable [`VibratoError`] kinds turn
//! into text; nothing below the dispatcher formats user-facing messages.

use vibrato_core::{TrackKind, VibratoError};

/// One human-readable status line per error kind.
pub fn status_line(error: &VibratoError) -> String {
    match error {
        VibratoError::Unauthorized => "Only admins can use this command.".to_string(),
        VibratoError::MaintenanceActive => {
            "The bot is currently in maintenance mode. Please try again later.".to_string()
        }
        VibratoError::NotAllowedGroup => {
            "This group is not authorized to use the bot. Please contact the bot owner."
                .to_string()
        }
        VibratoError::NoResults => "No results found. Please try another name.".to_string(),
        VibratoError::TooLong { kind, .. } => match kind {
            TrackKind::Song => {
                "The song is too long. Maximum allowed duration is 10 minutes.".to_string()
            }
            TrackKind::Video => {
                "The video is too long. Maximum allowed duration is 3 hours.".to_string()
            }
        },
        VibratoError::ResolutionFailed { .. } => {
            "An error occurred. Please try again later.".to_string()
        }
        VibratoError::PersistenceFailed { .. } => {
            "Done, but saving to disk failed. State will be retried shortly.".to_string()
        }
        VibratoError::NoContent => "No content available to expand.".to_string(),
        VibratoError::Superseded => {
            "Playback was stopped before this request finished.".to_string()
        }
        VibratoError::UnknownAdminCommand { name } => format!(
            "Unknown admin command `{name}`. Known commands: play, stop, radio."
        ),
        VibratoError::Config(_) | VibratoError::Internal(_) => {
            "An internal error occurred. Please try again later.".to_string()
        }
    }
}

/// Welcome text for `.start`.
pub fn welcome_text() -> String {
    "Welcome to Vibrato!\n\
     Queue music in your group with .play <song name>.\n\
     Send .help for the full command list."
        .to_string()
}

/// Help text for `.help`.
pub fn help_text() -> String {
    "Vibrato commands\n\
     \n\
     For everyone:\n\
     .start - welcome message\n\
     .help - this menu\n\
     \n\
     Admin commands (when enabled by the owner):\n\
     .play <song name> - queue a song\n\
     .radio <station> - stream a radio station\n\
     .stop - stop playback and clear the queue\n\
     \n\
     Owner commands:\n\
     .playvideo <url> - queue a video\n\
     .enableadmin <name> / .disableadmin <name> - manage the admin allow-list\n\
     .addgroup [chat] / .removegroup [chat] - manage allowed groups\n\
     .maintenance on|off - toggle maintenance mode\n\
     .stats - session and group counters"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_a_distinct_message() {
        let song_too_long = VibratoError::TooLong {
            kind: TrackKind::Song,
            duration_secs: 601,
            max_secs: 600,
        };
        let video_too_long = VibratoError::TooLong {
            kind: TrackKind::Video,
            duration_secs: 10_801,
            max_secs: 10_800,
        };
        assert!(status_line(&song_too_long).contains("10 minutes"));
        assert!(status_line(&video_too_long).contains("3 hours"));
        assert_ne!(
            status_line(&VibratoError::Unauthorized),
            status_line(&VibratoError::MaintenanceActive)
        );
    }

    #[test]
    fn unknown_admin_command_names_the_offender() {
        let err = VibratoError::UnknownAdminCommand {
            name: "selfdestruct".to_string(),
        };
        assert!(status_line(&err).contains("selfdestruct"));
    }

    #[test]
    fn internal_details_never_leak() {
        let err = VibratoError::Internal("secret backend detail".to_string());
        assert!(!status_line(&err).contains("secret"));
    }
}
