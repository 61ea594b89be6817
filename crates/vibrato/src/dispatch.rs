// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parsing and dispatch: the 1:1 mapping between the platform
//! command surface and engine/gate operations.
//!
//! The dispatcher is the presentation boundary. Everything below it
//! returns machine-readable [`VibratoError`] kinds; everything above it
//! sees only human-readable status strings.

use std::sync::Arc;

use tracing::debug;

use vibrato_core::{
    AdminCommand, ChatId, ChatKind, CommandClass, UserId, VibratoError,
};
use vibrato_engine::QueueEngine;
use vibrato_policy::PolicyGate;

use crate::render;

/// An inbound command as handed over by the chat platform.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub chat_id: ChatId,
    pub chat_kind: ChatKind,
    pub user_id: UserId,
    pub text: String,
}

/// The parsed command surface.
///
/// Dot-prefixed commands come from messages; `Expand`/`Collapse` arrive as
/// bare callback actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Play { query: String },
    Stop,
    PlayVideo { url: String },
    Radio { station: String },
    EnableAdmin { name: String },
    DisableAdmin { name: String },
    AddGroup { chat: Option<i64> },
    RemoveGroup { chat: Option<i64> },
    Maintenance { enabled: bool },
    Stats,
    Expand,
    Collapse,
}

/// Parse raw message text into a command, or `None` when the text is not
/// addressed to the bot.
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();

    // Callback actions are delivered without the command prefix.
    match text {
        "expand" => return Some(Command::Expand),
        "collapse" => return Some(Command::Collapse),
        _ => {}
    }

    let rest = text.strip_prefix('.')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next()?;
    let arg = parts.next().map(str::trim).unwrap_or("").to_string();

    let command = match name.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "play" | "rola" => Command::Play { query: arg },
        "stop" => Command::Stop,
        "playvideo" => Command::PlayVideo { url: arg },
        "radio" => Command::Radio { station: arg },
        "enableadmin" => Command::EnableAdmin { name: arg },
        "disableadmin" => Command::DisableAdmin { name: arg },
        "addgroup" => Command::AddGroup {
            chat: arg.parse().ok(),
        },
        "removegroup" => Command::RemoveGroup {
            chat: arg.parse().ok(),
        },
        "maintenance" => Command::Maintenance {
            enabled: matches!(arg.as_str(), "on" | "enable" | "true"),
        },
        "stats" => Command::Stats,
        _ => return None,
    };
    Some(command)
}

/// Routes parsed commands to the queue engine and policy gate.
pub struct Dispatcher {
    engine: Arc<QueueEngine>,
    policy: Arc<PolicyGate>,
}

impl Dispatcher {
    pub fn new(engine: Arc<QueueEngine>, policy: Arc<PolicyGate>) -> Self {
        Self { engine, policy }
    }

    /// Handle one inbound request and produce the status string to send
    /// back. Never panics, never leaks raw errors.
    pub async fn dispatch(&self, request: &CommandRequest) -> String {
        let Some(command) = parse_command(&request.text) else {
            return "Unknown command. Send .help for the command list.".to_string();
        };

        debug!(
            chat = %request.chat_id,
            user = %request.user_id,
            ?command,
            "dispatching command"
        );

        match self.run(request, command).await {
            Ok(status) => status,
            Err(e) => render::status_line(&e),
        }
    }

    async fn run(
        &self,
        request: &CommandRequest,
        command: Command,
    ) -> Result<String, VibratoError> {
        let chat = request.chat_id;
        let kind = request.chat_kind;
        let user = request.user_id;

        match command {
            Command::Start => {
                self.policy
                    .authorize(chat, kind, user, CommandClass::Open)
                    .await?;
                Ok(render::welcome_text())
            }
            Command::Help => Ok(render::help_text()),
            Command::Play { query } => {
                if query.is_empty() {
                    return Ok("Please send a song name: .play <song name>".to_string());
                }
                let track = self.engine.enqueue_song(chat, kind, user, &query).await?;
                Ok(format!("Now playing: {}", track.title))
            }
            Command::Stop => {
                self.engine.stop(chat, kind, user).await?;
                Ok("Playback stopped.".to_string())
            }
            Command::PlayVideo { url } => {
                if url.is_empty() {
                    return Ok("Please send a video URL: .playvideo <url>".to_string());
                }
                let track = self.engine.enqueue_video(chat, kind, user, &url).await?;
                Ok(format!("Now playing video: {}", track.title))
            }
            Command::Radio { station } => {
                if station.is_empty() {
                    let stations = self.engine.stations().await;
                    let names: Vec<&str> =
                        stations.stations.keys().map(String::as_str).collect();
                    return Ok(format!("Available stations: {}", names.join(", ")));
                }
                let track = self.engine.play_radio(chat, kind, user, &station).await?;
                Ok(format!("Tuned to {}", track.title))
            }
            Command::EnableAdmin { name } => {
                self.policy
                    .authorize(chat, kind, user, CommandClass::Owner)
                    .await?;
                let command = AdminCommand::parse(&name)?;
                if self.policy.enable_admin_command(user, command).await? {
                    Ok(format!("Admin command `{command}` enabled."))
                } else {
                    Ok(format!("Admin command `{command}` was already enabled."))
                }
            }
            Command::DisableAdmin { name } => {
                self.policy
                    .authorize(chat, kind, user, CommandClass::Owner)
                    .await?;
                let command = AdminCommand::parse(&name)?;
                if self.policy.disable_admin_command(user, command).await? {
                    Ok(format!("Admin command `{command}` disabled."))
                } else {
                    Ok(format!("Admin command `{command}` was not enabled."))
                }
            }
            Command::AddGroup { chat: target } => {
                self.policy
                    .authorize(chat, kind, user, CommandClass::Owner)
                    .await?;
                let group = ChatId(target.unwrap_or(chat.0));
                if self.policy.allow_group(user, group).await? {
                    Ok(format!("Group {group} can now use the bot."))
                } else {
                    Ok(format!("Group {group} was already allowed."))
                }
            }
            Command::RemoveGroup { chat: target } => {
                self.policy
                    .authorize(chat, kind, user, CommandClass::Owner)
                    .await?;
                let group = ChatId(target.unwrap_or(chat.0));
                if self.policy.disallow_group(user, group).await? {
                    Ok(format!("Group {group} removed."))
                } else {
                    Ok(format!("Group {group} was not on the list."))
                }
            }
            Command::Maintenance { enabled } => {
                self.policy
                    .authorize(chat, kind, user, CommandClass::Owner)
                    .await?;
                self.policy.set_maintenance(user, enabled).await?;
                Ok(if enabled {
                    "Maintenance mode enabled.".to_string()
                } else {
                    "Maintenance mode disabled.".to_string()
                })
            }
            Command::Stats => {
                self.policy
                    .authorize(chat, kind, user, CommandClass::Owner)
                    .await?;
                let stats = self.engine.stats().await;
                let groups = self.policy.allowed_group_count().await;
                Ok(format!(
                    "Sessions: {}\nActive calls: {}\nAllowed groups: {}",
                    stats.sessions, stats.active_calls, groups
                ))
            }
            Command::Expand => {
                let content = self.engine.expand(chat).await?;
                Ok(format!("Expanded content:\n{content}"))
            }
            Command::Collapse => {
                self.engine.collapse(chat).await?;
                Ok("Content collapsed.".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_with_query() {
        assert_eq!(
            parse_command(".play daft punk"),
            Some(Command::Play {
                query: "daft punk".to_string()
            })
        );
    }

    #[test]
    fn rola_is_a_play_alias() {
        assert_eq!(
            parse_command(".rola daft punk"),
            Some(Command::Play {
                query: "daft punk".to_string()
            })
        );
    }

    #[test]
    fn parses_bare_callback_actions() {
        assert_eq!(parse_command("expand"), Some(Command::Expand));
        assert_eq!(parse_command("collapse"), Some(Command::Collapse));
    }

    #[test]
    fn parses_owner_commands() {
        assert_eq!(
            parse_command(".enableadmin play"),
            Some(Command::EnableAdmin {
                name: "play".to_string()
            })
        );
        assert_eq!(
            parse_command(".maintenance on"),
            Some(Command::Maintenance { enabled: true })
        );
        assert_eq!(
            parse_command(".maintenance off"),
            Some(Command::Maintenance { enabled: false })
        );
        assert_eq!(
            parse_command(".addgroup -100123"),
            Some(Command::AddGroup { chat: Some(-100123) })
        );
        assert_eq!(parse_command(".addgroup"), Some(Command::AddGroup { chat: None }));
    }

    #[test]
    fn command_names_are_case_insensitive() {
        assert_eq!(parse_command(".STOP"), Some(Command::Stop));
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(parse_command("just chatting"), None);
        assert_eq!(parse_command(".unknowncmd"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn play_without_query_is_still_a_command() {
        // The dispatcher answers with usage text rather than ignoring it.
        assert_eq!(
            parse_command(".play"),
            Some(Command::Play {
                query: String::new()
            })
        );
    }

    mod end_to_end {
        use super::super::*;
        use vibrato_test_utils::TestHarness;

        fn dispatcher_for(harness: &TestHarness) -> Dispatcher {
            Dispatcher::new(harness.engine.clone(), harness.policy.clone())
        }

        fn request(chat: i64, kind: ChatKind, user: UserId, text: &str) -> CommandRequest {
            CommandRequest {
                chat_id: ChatId(chat),
                chat_kind: kind,
                user_id: user,
                text: text.to_string(),
            }
        }

        #[tokio::test]
        async fn play_reports_the_queued_title() {
            let harness = TestHarness::builder()
                .with_allowed_group(ChatId(7))
                .with_admin(ChatId(7), UserId(2))
                .build()
                .await;
            let dispatcher = dispatcher_for(&harness);

            let response = dispatcher
                .dispatch(&request(7, ChatKind::Group, UserId(2), ".play foo"))
                .await;
            assert_eq!(response, "Now playing: foo");
        }

        #[tokio::test]
        async fn denials_render_as_status_text() {
            let harness = TestHarness::builder().build().await;
            let dispatcher = dispatcher_for(&harness);

            // Group not on the allowed list.
            let response = dispatcher
                .dispatch(&request(7, ChatKind::Group, UserId(2), ".play foo"))
                .await;
            assert!(response.contains("not authorized"));

            // Non-owner issuing an owner command.
            let response = dispatcher
                .dispatch(&request(
                    7,
                    ChatKind::Private,
                    UserId(2),
                    ".maintenance on",
                ))
                .await;
            assert!(response.contains("admins"));
        }

        #[tokio::test]
        async fn unknown_admin_command_is_rejected_not_ignored() {
            let harness = TestHarness::builder().build().await;
            let dispatcher = dispatcher_for(&harness);

            let response = dispatcher
                .dispatch(&request(
                    1000,
                    ChatKind::Private,
                    harness.owner,
                    ".enableadmin selfdestruct",
                ))
                .await;
            assert!(response.contains("Unknown admin command"));
        }

        #[tokio::test]
        async fn owner_panel_commands_round_trip() {
            let harness = TestHarness::builder().build().await;
            let dispatcher = dispatcher_for(&harness);
            let owner = harness.owner;

            let response = dispatcher
                .dispatch(&request(
                    1000,
                    ChatKind::Private,
                    owner,
                    ".addgroup -100123",
                ))
                .await;
            assert!(response.contains("-100123"));

            let response = dispatcher
                .dispatch(&request(1000, ChatKind::Private, owner, ".stats"))
                .await;
            assert!(response.contains("Allowed groups: 1"));

            let response = dispatcher
                .dispatch(&request(
                    1000,
                    ChatKind::Private,
                    owner,
                    ".removegroup -100123",
                ))
                .await;
            assert!(response.contains("removed"));
        }

        #[tokio::test]
        async fn expand_without_content_reports_no_content() {
            let harness = TestHarness::builder().build().await;
            let dispatcher = dispatcher_for(&harness);

            let response = dispatcher
                .dispatch(&request(
                    1000,
                    ChatKind::Private,
                    harness.owner,
                    "expand",
                ))
                .await;
            assert!(response.contains("No content"));
        }
    }
}
