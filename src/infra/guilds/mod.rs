pub mod config_file;
pub mod sqlite_store;

pub use config_file::load_guilds_config;
pub use sqlite_store::SqliteGuildStore;
