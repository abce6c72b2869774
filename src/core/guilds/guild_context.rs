// Guild context - single point of access to "everything known about a community".
//
// A context is built per inbound event. It holds the live guild handle, the
// community's configuration subtree and a snapshot of the persisted record.
// The snapshot is refreshed after every write made through this context, but
// not after writes made elsewhere.

use super::guild_config::{CommunityConfig, GuildsConfig};
use super::guild_models::{FieldValue, GuildField, GuildPatch, GuildRecord};
use super::guild_store::{GuildError, GuildStore};
use dashmap::DashMap;

/// The subset of a live guild that the context needs.
///
/// Implemented by the Discord layer for a cached guild; the core never sees
/// gateway types.
pub trait GuildHandle: Send + Sync {
    type Member: Clone + Send + Sync;
    type Role: Clone + Send + Sync;
    type Emoji: Clone + Send + Sync;
    type Channel: Clone + Send + Sync;

    fn id(&self) -> u64;
    fn name(&self) -> &str;

    /// Current membership, in no particular order.
    fn members(&self) -> Vec<&Self::Member>;
    fn member_name(member: &Self::Member) -> &str;
    fn member_id(member: &Self::Member) -> u64;

    fn role(&self, role_id: u64) -> Option<&Self::Role>;

    fn emojis(&self) -> Vec<&Self::Emoji>;
    fn emoji_name(emoji: &Self::Emoji) -> &str;

    /// A text channel of this guild, if `channel_id` names one.
    fn text_channel(&self, channel_id: u64) -> Option<&Self::Channel>;
}

/// Process-wide entry point: static configuration plus the guild store.
pub struct GuildDirectory<S: GuildStore> {
    config: GuildsConfig,
    store: S,
}

impl<S: GuildStore> GuildDirectory<S> {
    pub fn new(config: GuildsConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Configuration subtree for a guild, without touching storage.
    pub fn config(&self, guild_id: u64) -> CommunityConfig {
        self.config.community(guild_id)
    }

    /// Build a context for `handle`, fetching its record by primary key.
    ///
    /// An unregistered guild is not an error; `exists()` reports false.
    pub async fn context<H: GuildHandle>(
        &self,
        handle: H,
    ) -> Result<GuildContext<'_, H, S>, GuildError> {
        let config = self.config.community(handle.id());
        let record = self.store.fetch_guild(handle.id()).await?;

        Ok(GuildContext {
            handle,
            config,
            store: &self.store,
            record,
            members_by_name: DashMap::new(),
        })
    }
}

pub struct GuildContext<'s, H: GuildHandle, S: GuildStore> {
    handle: H,
    config: CommunityConfig,
    store: &'s S,
    record: Option<GuildRecord>,
    // Lives as long as the context, i.e. one event.
    members_by_name: DashMap<String, Option<H::Member>>,
}

impl<'s, H: GuildHandle, S: GuildStore> GuildContext<'s, H, S> {
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn config(&self) -> &CommunityConfig {
        &self.config
    }

    /// Last fetched snapshot of the persisted record.
    pub fn record(&self) -> Option<&GuildRecord> {
        self.record.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.record.is_some()
    }

    /// Insert the record for this guild. Callers must check `exists()` first;
    /// there is no upsert.
    pub async fn register(&mut self) -> Result<(), GuildError> {
        self.store
            .insert_guild(self.handle.id(), self.handle.name())
            .await?;
        self.refresh().await
    }

    /// Patch the record with `(column, value)` pairs.
    ///
    /// All columns are validated before anything is written.
    pub async fn update<I, K>(&mut self, fields: I) -> Result<(), GuildError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: AsRef<str>,
    {
        let patch = GuildPatch::parse(fields)?;
        self.apply(patch).await
    }

    async fn apply(&mut self, patch: GuildPatch) -> Result<(), GuildError> {
        if patch.is_empty() {
            return if self.exists() {
                Ok(())
            } else {
                Err(GuildError::RecordNotFound(self.handle.id()))
            };
        }

        self.store.update_guild(self.handle.id(), &patch).await?;
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<(), GuildError> {
        self.record = self.store.fetch_guild(self.handle.id()).await?;
        Ok(())
    }

    /// Member whose name matches, memoized for the life of the context.
    ///
    /// Names are not unique; the lowest user id (the oldest account) wins.
    pub fn get_member_by_name(&self, name: &str) -> Option<H::Member> {
        if let Some(hit) = self.members_by_name.get(name) {
            return hit.value().clone();
        }

        let found = self
            .handle
            .members()
            .into_iter()
            .filter(|member| H::member_name(member) == name)
            .min_by_key(|member| H::member_id(member))
            .cloned();
        self.members_by_name.insert(name.to_string(), found.clone());
        found
    }

    pub fn get_role_by_qualifier(&self, qualifier: &str) -> Option<H::Role> {
        self.config
            .role_id(qualifier)
            .and_then(|role_id| self.handle.role(role_id))
            .cloned()
    }

    pub fn get_emoji_by_name(&self, name: &str) -> Option<H::Emoji> {
        self.handle
            .emojis()
            .into_iter()
            .find(|emoji| H::emoji_name(emoji) == name)
            .cloned()
    }

    pub fn get_log_channel(&self) -> Option<H::Channel> {
        self.config
            .log_channel()
            .and_then(|channel_id| self.handle.text_channel(channel_id))
            .cloned()
    }

    pub fn roles_message_id(&self) -> Option<u64> {
        self.record.as_ref().and_then(|r| r.roles_message_id)
    }

    pub async fn set_roles_message_id(
        &mut self,
        message_id: Option<u64>,
    ) -> Result<(), GuildError> {
        let patch = GuildPatch::set(GuildField::RolesMessageId, FieldValue::Id(message_id))?;
        self.apply(patch).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct MockMember {
        id: u64,
        name: String,
    }

    struct MockGuild {
        id: u64,
        name: String,
        members: Vec<MockMember>,
        roles: HashMap<u64, String>,
        emojis: Vec<String>,
        text_channels: Vec<u64>,
        member_scans: AtomicUsize,
    }

    impl MockGuild {
        fn new(id: u64) -> Self {
            Self {
                id,
                name: "Prépas MP2I".to_string(),
                members: vec![
                    MockMember { id: 1, name: "alice".into() },
                    MockMember { id: 2, name: "bob".into() },
                    MockMember { id: 3, name: "alice".into() },
                ],
                roles: HashMap::from([(21, "Modérateur".to_string())]),
                emojis: vec!["kappa".into(), "pog".into()],
                text_channels: vec![12],
                member_scans: AtomicUsize::new(0),
            }
        }
    }

    impl GuildHandle for MockGuild {
        type Member = MockMember;
        type Role = String;
        type Emoji = String;
        type Channel = u64;

        fn id(&self) -> u64 {
            self.id
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn members(&self) -> Vec<&MockMember> {
            self.member_scans.fetch_add(1, Ordering::SeqCst);
            self.members.iter().collect()
        }

        fn member_name(member: &MockMember) -> &str {
            &member.name
        }

        fn member_id(member: &MockMember) -> u64 {
            member.id
        }

        fn role(&self, role_id: u64) -> Option<&String> {
            self.roles.get(&role_id)
        }

        fn emojis(&self) -> Vec<&String> {
            self.emojis.iter().collect()
        }

        fn emoji_name(emoji: &String) -> &str {
            emoji
        }

        fn text_channel(&self, channel_id: u64) -> Option<&u64> {
            self.text_channels.iter().find(|id| **id == channel_id)
        }
    }

    /// In-memory store that counts reads and writes
    #[derive(Default)]
    struct MockGuildStore {
        rows: DashMap<u64, GuildRecord>,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl GuildStore for MockGuildStore {
        async fn insert_guild(&self, id: u64, name: &str) -> Result<(), GuildError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.rows.contains_key(&id) {
                return Err(GuildError::DuplicateKey(id));
            }
            self.rows.insert(
                id,
                GuildRecord {
                    id,
                    name: name.to_string(),
                    roles_message_id: None,
                },
            );
            Ok(())
        }

        async fn fetch_guild(&self, id: u64) -> Result<Option<GuildRecord>, GuildError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.get(&id).map(|r| r.clone()))
        }

        async fn update_guild(&self, id: u64, patch: &GuildPatch) -> Result<(), GuildError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            match self.rows.get_mut(&id) {
                Some(mut row) => {
                    patch.apply_to(&mut row);
                    Ok(())
                }
                None => Err(GuildError::RecordNotFound(id)),
            }
        }
    }

    fn config() -> GuildsConfig {
        serde_json::from_str(
            r#"{ "guilds": { "1000": {
                "channels": { "suggestion": 11, "log": 12 },
                "roles": { "moderator": { "id": 21 }, "stale": { "id": 99 } }
            } } }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unregistered_guild_is_not_an_error() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let ctx = directory.context(MockGuild::new(1000)).await.unwrap();

        assert!(!ctx.exists());
        assert_eq!(ctx.record(), None);
        assert_eq!(ctx.roles_message_id(), None);
    }

    #[tokio::test]
    async fn register_writes_then_refreshes() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let mut ctx = directory.context(MockGuild::new(1000)).await.unwrap();

        ctx.register().await.unwrap();

        assert!(ctx.exists());
        assert_eq!(ctx.record().unwrap().name, "Prépas MP2I");
        // one read at construction, one write + one read for register
        assert_eq!(directory.store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(directory.store.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn register_twice_is_duplicate_key() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let mut ctx = directory.context(MockGuild::new(1000)).await.unwrap();
        ctx.register().await.unwrap();

        let mut again = directory.context(MockGuild::new(1000)).await.unwrap();
        let err = again.register().await.unwrap_err();

        assert!(matches!(err, GuildError::DuplicateKey(1000)));
    }

    #[tokio::test]
    async fn update_without_record_is_record_not_found() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let mut ctx = directory.context(MockGuild::new(1000)).await.unwrap();

        let err = ctx
            .update([("name", FieldValue::Text("new".into()))])
            .await
            .unwrap_err();
        assert!(matches!(err, GuildError::RecordNotFound(1000)));

        let err = ctx.update(Vec::<(&str, FieldValue)>::new()).await.unwrap_err();
        assert!(matches!(err, GuildError::RecordNotFound(1000)));
    }

    #[tokio::test]
    async fn update_rejects_unknown_field_before_writing() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let mut ctx = directory.context(MockGuild::new(1000)).await.unwrap();
        ctx.register().await.unwrap();
        let writes_before = directory.store.writes.load(Ordering::SeqCst);

        let err = ctx
            .update([
                ("name", FieldValue::Text("renamed".into())),
                ("banner", FieldValue::Text("x".into())),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, GuildError::InvalidField(_)));
        assert_eq!(directory.store.writes.load(Ordering::SeqCst), writes_before);
        assert_eq!(ctx.record().unwrap().name, "Prépas MP2I");
    }

    #[tokio::test]
    async fn roles_message_id_setter_writes_through() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let mut ctx = directory.context(MockGuild::new(1000)).await.unwrap();
        ctx.register().await.unwrap();

        ctx.set_roles_message_id(Some(777)).await.unwrap();
        assert_eq!(ctx.roles_message_id(), Some(777));

        // A fresh context sees the persisted value
        let fresh = directory.context(MockGuild::new(1000)).await.unwrap();
        assert_eq!(fresh.roles_message_id(), Some(777));

        ctx.set_roles_message_id(None).await.unwrap();
        assert_eq!(ctx.roles_message_id(), None);
    }

    #[tokio::test]
    async fn snapshot_is_not_refreshed_by_other_writers() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let mut first = directory.context(MockGuild::new(1000)).await.unwrap();
        first.register().await.unwrap();
        let second = directory.context(MockGuild::new(1000)).await.unwrap();

        first.set_roles_message_id(Some(5)).await.unwrap();

        assert_eq!(first.roles_message_id(), Some(5));
        assert_eq!(second.roles_message_id(), None);
    }

    #[tokio::test]
    async fn member_lookup_memoizes() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let ctx = directory.context(MockGuild::new(1000)).await.unwrap();

        let alice = ctx.get_member_by_name("alice").unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(ctx.get_member_by_name("alice").unwrap().id, 1);
        assert_eq!(ctx.handle().member_scans.load(Ordering::SeqCst), 1);

        assert_eq!(ctx.get_member_by_name("nobody"), None);
        assert_eq!(ctx.get_member_by_name("nobody"), None);
        assert_eq!(ctx.handle().member_scans.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn duplicate_names_resolve_to_the_oldest_account() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let mut guild = MockGuild::new(1000);
        // Listing order must not matter
        guild.members.reverse();
        let ctx = directory.context(guild).await.unwrap();

        assert_eq!(ctx.get_member_by_name("alice").unwrap().id, 1);
    }

    #[tokio::test]
    async fn lookups_return_absence_instead_of_failing() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let ctx = directory.context(MockGuild::new(1000)).await.unwrap();

        assert_eq!(ctx.get_role_by_qualifier("moderator").as_deref(), Some("Modérateur"));
        assert_eq!(ctx.get_role_by_qualifier("stale"), None);
        assert_eq!(ctx.get_role_by_qualifier("unknown"), None);

        assert_eq!(ctx.get_emoji_by_name("pog").as_deref(), Some("pog"));
        assert_eq!(ctx.get_emoji_by_name("missing"), None);

        assert_eq!(ctx.get_log_channel(), Some(12));
    }

    #[tokio::test]
    async fn unconfigured_guild_has_no_log_channel() {
        let directory = GuildDirectory::new(config(), MockGuildStore::default());
        let ctx = directory.context(MockGuild::new(4242)).await.unwrap();

        assert_eq!(ctx.get_log_channel(), None);
        assert_eq!(ctx.get_role_by_qualifier("moderator"), None);
        assert!(!ctx.config().is_suggestion_channel(11));
    }
}
