// Discord layer - commands, event handlers and the shared framework data.

use crate::core::guilds::GuildDirectory;
use crate::core::pins::PinService;
use crate::core::suggestions::SuggestionService;
use crate::infra::assets::StaticAssets;
use crate::infra::guilds::SqliteGuildStore;
use crate::infra::suggestions::SqliteSuggestionStore;
use std::sync::Arc;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "gateway.rs"]
pub mod gateway;

#[path = "guilds/mod.rs"]
pub mod guilds;

#[path = "suggestions/mod.rs"]
pub mod suggestions;

#[path = "pins/mod.rs"]
pub mod pins;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Services shared by every command and event handler.
pub struct Data {
    pub guilds: Arc<GuildDirectory<SqliteGuildStore>>,
    pub suggestions: Arc<SuggestionService<SqliteSuggestionStore>>,
    pub pins: Arc<PinService>,
    pub assets: Arc<StaticAssets>,
}
