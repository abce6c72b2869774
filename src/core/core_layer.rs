// The core module contains all business logic.
// Each feature gets its own submodule; none of them depend on Discord types.

#[path = "claims/mod.rs"]
pub mod claims;

#[path = "guilds/mod.rs"]
pub mod guilds;

#[path = "suggestions/mod.rs"]
pub mod suggestions;

#[path = "pins/mod.rs"]
pub mod pins;
