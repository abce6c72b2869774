// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "guilds/mod.rs"]
pub mod guilds;

#[path = "suggestions/mod.rs"]
pub mod suggestions;

#[path = "assets/mod.rs"]
pub mod assets;
