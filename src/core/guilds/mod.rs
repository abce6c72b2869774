// Core guild module - everything known about a community.
// Static configuration, the persisted guild record and the per-event context
// that binds both to a live guild handle.

pub mod guild_config;
pub mod guild_context;
pub mod guild_models;
pub mod guild_store;

pub use guild_config::*;
pub use guild_context::*;
pub use guild_models::*;
pub use guild_store::*;
