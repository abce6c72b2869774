pub mod guild_handle;

pub use guild_handle::{cached_guild, handle_guild_create};
