// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The policy gate: every mutating command passes through here first.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use vibrato_core::traits::{DocumentStore, RoleProvider};
use vibrato_core::{AdminCommand, ChatId, ChatKind, CommandClass, UserId, VibratoError};
use vibrato_store::{
    ADMIN_COMMANDS_KEY, ALLOWED_GROUPS_KEY, AdminCommandsDocument, AllowedGroupsDocument,
    MAINTENANCE_KEY, MaintenanceDocument, load_document, save_document,
};

/// Persisted policy state, guarded by one process-wide RwLock.
///
/// Unlike session state this is read on every command and mutated rarely,
/// so a single lock is fine.
#[derive(Debug, Default)]
struct PolicyState {
    maintenance: bool,
    allowed_groups: BTreeSet<i64>,
    allowed_admin: BTreeSet<AdminCommand>,
}

/// Authorizes commands against `{role, allow-list, maintenance flag,
/// group allow-list}` and owns the persisted copies of all three lists.
pub struct PolicyGate {
    owner: UserId,
    roles: Arc<dyn RoleProvider>,
    store: Arc<dyn DocumentStore>,
    state: RwLock<PolicyState>,
}

impl PolicyGate {
    pub fn new(owner: UserId, roles: Arc<dyn RoleProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            owner,
            roles,
            store,
            state: RwLock::new(PolicyState::default()),
        }
    }

    /// The configured bot owner.
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Restore maintenance flag, group list, and admin allow-list from the
    /// store. Allow-list entries outside the closed command set are
    /// skipped with a warning, never silently honored.
    pub async fn load(&self) {
        let maintenance: MaintenanceDocument =
            load_document(self.store.as_ref(), MAINTENANCE_KEY).await;
        let groups: AllowedGroupsDocument =
            load_document(self.store.as_ref(), ALLOWED_GROUPS_KEY).await;
        let admin: AdminCommandsDocument =
            load_document(self.store.as_ref(), ADMIN_COMMANDS_KEY).await;

        let mut allowed_admin = BTreeSet::new();
        for name in &admin.allowed_admin_commands {
            match AdminCommand::parse(name) {
                Ok(cmd) => {
                    allowed_admin.insert(cmd);
                }
                Err(_) => {
                    warn!(name, "ignoring unknown command in persisted allow-list");
                }
            }
        }

        let mut state = self.state.write().await;
        state.maintenance = maintenance.enabled;
        state.allowed_groups = groups.chats;
        state.allowed_admin = allowed_admin;
        info!(
            maintenance = state.maintenance,
            groups = state.allowed_groups.len(),
            admin_commands = state.allowed_admin.len(),
            "policy state loaded"
        );
    }

    /// Authorize `user` to run a command of the given class in `chat`.
    ///
    /// Checks run in a fixed order: maintenance gate, group allow-list,
    /// owner scope, then role + admin allow-list. Any role-lookup failure
    /// denies (fail-closed).
    pub async fn authorize(
        &self,
        chat: ChatId,
        chat_kind: ChatKind,
        user: UserId,
        class: CommandClass,
    ) -> Result<(), VibratoError> {
        let command = {
            let state = self.state.read().await;

            if state.maintenance && user != self.owner {
                return Err(VibratoError::MaintenanceActive);
            }

            if chat_kind == ChatKind::Group && !state.allowed_groups.contains(&chat.0) {
                return Err(VibratoError::NotAllowedGroup);
            }

            match class {
                CommandClass::Open => return Ok(()),
                CommandClass::Owner => {
                    return if user == self.owner {
                        Ok(())
                    } else {
                        Err(VibratoError::Unauthorized)
                    };
                }
                CommandClass::Admin(command) => command,
            }
            // Lock released here: the role lookup below suspends.
        };

        let role = match self.roles.member_role(chat, user).await {
            Ok(role) => role,
            Err(e) => {
                // Fail closed: an unanswerable lookup is a denial.
                warn!(%chat, %user, error = %e, "role lookup failed, denying");
                return Err(VibratoError::Unauthorized);
            }
        };
        if !role.can_administer() {
            return Err(VibratoError::Unauthorized);
        }

        if !self.state.read().await.allowed_admin.contains(&command) {
            debug!(%chat, %user, %command, "admin command not on the allow-list");
            return Err(VibratoError::Unauthorized);
        }

        Ok(())
    }

    /// Enable an admin command (owner only). Idempotent: enabling an
    /// already-present command is a no-op. Returns whether the set changed.
    pub async fn enable_admin_command(
        &self,
        user: UserId,
        command: AdminCommand,
    ) -> Result<bool, VibratoError> {
        self.require_owner(user)?;
        let changed = {
            let mut state = self.state.write().await;
            state.allowed_admin.insert(command)
        };
        if changed {
            info!(%command, "admin command enabled");
            self.persist_admin_commands().await;
        }
        Ok(changed)
    }

    /// Disable an admin command (owner only). Idempotent: removing an
    /// absent command is a no-op. Returns whether the set changed.
    pub async fn disable_admin_command(
        &self,
        user: UserId,
        command: AdminCommand,
    ) -> Result<bool, VibratoError> {
        self.require_owner(user)?;
        let changed = {
            let mut state = self.state.write().await;
            state.allowed_admin.remove(&command)
        };
        if changed {
            info!(%command, "admin command disabled");
            self.persist_admin_commands().await;
        }
        Ok(changed)
    }

    /// Set the process-wide maintenance flag (owner only).
    pub async fn set_maintenance(&self, user: UserId, enabled: bool) -> Result<(), VibratoError> {
        self.require_owner(user)?;
        {
            let mut state = self.state.write().await;
            state.maintenance = enabled;
        }
        info!(enabled, "maintenance mode set");
        let doc = MaintenanceDocument {
            enabled,
            ..MaintenanceDocument::default()
        };
        if let Err(e) = save_document(self.store.as_ref(), MAINTENANCE_KEY, &doc).await {
            warn!(error = %e, "maintenance flag not persisted, in-memory value stays live");
        }
        Ok(())
    }

    /// Add a chat to the allowed-groups list (owner only). Idempotent.
    pub async fn allow_group(&self, user: UserId, chat: ChatId) -> Result<bool, VibratoError> {
        self.require_owner(user)?;
        let changed = {
            let mut state = self.state.write().await;
            state.allowed_groups.insert(chat.0)
        };
        if changed {
            info!(%chat, "group allowed");
            self.persist_groups().await;
        }
        Ok(changed)
    }

    /// Remove a chat from the allowed-groups list (owner only). Idempotent.
    pub async fn disallow_group(&self, user: UserId, chat: ChatId) -> Result<bool, VibratoError> {
        self.require_owner(user)?;
        let changed = {
            let mut state = self.state.write().await;
            state.allowed_groups.remove(&chat.0)
        };
        if changed {
            info!(%chat, "group removed");
            self.persist_groups().await;
        }
        Ok(changed)
    }

    /// Whether maintenance mode is currently active.
    pub async fn maintenance_active(&self) -> bool {
        self.state.read().await.maintenance
    }

    /// Snapshot of the current admin allow-list.
    pub async fn allowed_commands(&self) -> BTreeSet<AdminCommand> {
        self.state.read().await.allowed_admin.clone()
    }

    /// Number of allowed groups (owner-panel stats).
    pub async fn allowed_group_count(&self) -> usize {
        self.state.read().await.allowed_groups.len()
    }

    fn require_owner(&self, user: UserId) -> Result<(), VibratoError> {
        if user == self.owner {
            Ok(())
        } else {
            Err(VibratoError::Unauthorized)
        }
    }

    async fn persist_admin_commands(&self) {
        let doc = {
            let state = self.state.read().await;
            AdminCommandsDocument {
                allowed_admin_commands: state
                    .allowed_admin
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                ..AdminCommandsDocument::default()
            }
        };
        if let Err(e) = save_document(self.store.as_ref(), ADMIN_COMMANDS_KEY, &doc).await {
            warn!(error = %e, "admin allow-list not persisted, in-memory value stays live");
        }
    }

    async fn persist_groups(&self) {
        let doc = {
            let state = self.state.read().await;
            AllowedGroupsDocument {
                chats: state.allowed_groups.clone(),
                ..AllowedGroupsDocument::default()
            }
        };
        if let Err(e) = save_document(self.store.as_ref(), ALLOWED_GROUPS_KEY, &doc).await {
            warn!(error = %e, "allowed-groups list not persisted, in-memory value stays live");
        }
    }
}
