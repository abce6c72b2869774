use super::guild_models::{GuildPatch, GuildRecord};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum GuildError {
    /// An update targeted a guild that has never been registered.
    #[error("No guild record for {0}")]
    RecordNotFound(u64),

    /// `register` was called for a guild that already has a record.
    #[error("Guild {0} is already registered")]
    DuplicateKey(u64),

    #[error("Invalid guild field: {0}")]
    InvalidField(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Persistence for guild records.
#[async_trait]
pub trait GuildStore: Send + Sync {
    /// Insert a new record. Fails with `DuplicateKey` if `id` is taken.
    async fn insert_guild(&self, id: u64, name: &str) -> Result<(), GuildError>;

    /// Select by primary key. An unregistered guild is `Ok(None)`.
    async fn fetch_guild(&self, id: u64) -> Result<Option<GuildRecord>, GuildError>;

    /// Patch an existing record. Fails with `RecordNotFound` if no row matches.
    async fn update_guild(&self, id: u64, patch: &GuildPatch) -> Result<(), GuildError>;
}
