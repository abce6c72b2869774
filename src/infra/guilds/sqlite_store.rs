// SQLite-backed guild store.
//
// Tables:
// - guilds: one row per registered community, keyed by the Discord guild id

use crate::core::guilds::{FieldValue, GuildError, GuildPatch, GuildRecord, GuildStore};
use async_trait::async_trait;
use sqlx::{Pool, QueryBuilder, Row, Sqlite};

pub struct SqliteGuildStore {
    pool: Pool<Sqlite>,
}

impl SqliteGuildStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), GuildError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guilds (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                roles_message_id INTEGER
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| GuildError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl GuildStore for SqliteGuildStore {
    async fn insert_guild(&self, id: u64, name: &str) -> Result<(), GuildError> {
        let result = sqlx::query(
            r#"
            INSERT INTO guilds (id, name)
            VALUES (?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(id as i64)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| GuildError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(GuildError::DuplicateKey(id));
        }
        Ok(())
    }

    async fn fetch_guild(&self, id: u64) -> Result<Option<GuildRecord>, GuildError> {
        let row = sqlx::query("SELECT id, name, roles_message_id FROM guilds WHERE id = ?")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GuildError::StorageError(e.to_string()))?;

        Ok(row.map(|row| GuildRecord {
            id: row.get::<i64, _>("id") as u64,
            name: row.get("name"),
            roles_message_id: row
                .get::<Option<i64>, _>("roles_message_id")
                .map(|id| id as u64),
        }))
    }

    async fn update_guild(&self, id: u64, patch: &GuildPatch) -> Result<(), GuildError> {
        if patch.is_empty() {
            return Ok(());
        }

        // Column names come from GuildField, never from user input.
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE guilds SET ");
        {
            let mut columns = query.separated(", ");
            for (field, value) in patch.iter() {
                columns.push(field.column());
                columns.push_unseparated(" = ");
                match value {
                    FieldValue::Text(text) => {
                        columns.push_bind_unseparated(text.clone());
                    }
                    FieldValue::Id(message_id) => {
                        columns.push_bind_unseparated(message_id.map(|id| id as i64));
                    }
                }
            }
        }
        query.push(" WHERE id = ");
        query.push_bind(id as i64);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| GuildError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(GuildError::RecordNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::TempDir;

    async fn open_store() -> (SqliteGuildStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("community.db").display()
        );
        let pool = SqlitePoolOptions::new().connect(&url).await.unwrap();
        let store = SqliteGuildStore::new(pool);
        store.migrate().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn insert_then_fetch() {
        let (store, _dir) = open_store().await;

        assert_eq!(store.fetch_guild(1000).await.unwrap(), None);

        store.insert_guild(1000, "Prépas MP2I").await.unwrap();
        let record = store.fetch_guild(1000).await.unwrap().unwrap();

        assert_eq!(
            record,
            GuildRecord {
                id: 1000,
                name: "Prépas MP2I".to_string(),
                roles_message_id: None,
            }
        );
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let (store, _dir) = open_store().await;
        store.insert_guild(1000, "first").await.unwrap();

        let err = store.insert_guild(1000, "second").await.unwrap_err();

        assert!(matches!(err, GuildError::DuplicateKey(1000)));
        let record = store.fetch_guild(1000).await.unwrap().unwrap();
        assert_eq!(record.name, "first");
    }

    #[tokio::test]
    async fn update_patches_only_named_columns() {
        let (store, _dir) = open_store().await;
        store.insert_guild(1000, "Prépas MP2I").await.unwrap();

        let patch =
            GuildPatch::parse([("roles_message_id", FieldValue::Id(Some(1_234_567_890_123)))])
                .unwrap();
        store.update_guild(1000, &patch).await.unwrap();

        let record = store.fetch_guild(1000).await.unwrap().unwrap();
        assert_eq!(record.name, "Prépas MP2I");
        assert_eq!(record.roles_message_id, Some(1_234_567_890_123));

        let patch = GuildPatch::parse([
            ("name", FieldValue::Text("MP2I".into())),
            ("roles_message_id", FieldValue::Id(None)),
        ])
        .unwrap();
        store.update_guild(1000, &patch).await.unwrap();

        let record = store.fetch_guild(1000).await.unwrap().unwrap();
        assert_eq!(record.name, "MP2I");
        assert_eq!(record.roles_message_id, None);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_record_not_found() {
        let (store, _dir) = open_store().await;

        let patch = GuildPatch::parse([("name", FieldValue::Text("ghost".into()))]).unwrap();
        let err = store.update_guild(404, &patch).await.unwrap_err();

        assert!(matches!(err, GuildError::RecordNotFound(404)));
    }
}
