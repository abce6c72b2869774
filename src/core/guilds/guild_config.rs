// Static per-community configuration, loaded once at startup.
//
// Every field is optional: a community that is missing from the file, or a
// key that is missing inside a community, resolves to an empty default.
// Absent configuration is a valid, inert state rather than an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Quorum of pin reactions needed before a message is promoted.
pub const DEFAULT_MINIMUM_PINS: u64 = 5;

/// Top-level configuration document, keyed by guild id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuildsConfig {
    #[serde(default)]
    pub guilds: HashMap<u64, CommunityConfig>,
}

impl GuildsConfig {
    /// Configuration subtree for one community, or an empty default.
    pub fn community(&self, guild_id: u64) -> CommunityConfig {
        self.guilds.get(&guild_id).cloned().unwrap_or_default()
    }
}

/// Configuration subtree for a single community.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityConfig {
    #[serde(default)]
    pub channels: ChannelsConfig,
    /// Qualifier (e.g. "moderator") -> role.
    #[serde(default)]
    pub roles: HashMap<String, RoleConfig>,
    /// Overrides [`DEFAULT_MINIMUM_PINS`] for this community.
    #[serde(default)]
    pub minimum_pins: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub suggestion: Option<u64>,
    #[serde(default)]
    pub log: Option<u64>,
    /// Public channel that receives promoted pins.
    #[serde(default)]
    pub website: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleConfig {
    #[serde(default)]
    pub id: Option<u64>,
}

impl CommunityConfig {
    pub fn suggestion_channel(&self) -> Option<u64> {
        non_zero(self.channels.suggestion)
    }

    pub fn log_channel(&self) -> Option<u64> {
        non_zero(self.channels.log)
    }

    pub fn website_channel(&self) -> Option<u64> {
        non_zero(self.channels.website)
    }

    pub fn role_id(&self, qualifier: &str) -> Option<u64> {
        self.roles.get(qualifier).and_then(|role| non_zero(role.id))
    }

    pub fn minimum_pins(&self) -> u64 {
        self.minimum_pins.unwrap_or(DEFAULT_MINIMUM_PINS)
    }

    pub fn is_suggestion_channel(&self, channel_id: u64) -> bool {
        self.suggestion_channel() == Some(channel_id)
    }
}

// Discord ids are never zero; treat a zero in the file as "not configured".
fn non_zero(id: Option<u64>) -> Option<u64> {
    id.filter(|id| *id != 0)
}
