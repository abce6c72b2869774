// SQLite-backed suggestion store. Append-only.
//
// Tables:
// - suggestions: accepted suggestions (author, acceptance date, text)

use crate::core::suggestions::{SuggestionError, SuggestionRecord, SuggestionStore};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

pub struct SqliteSuggestionStore {
    pool: Pool<Sqlite>,
}

impl SqliteSuggestionStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), SuggestionError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS suggestions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SuggestionError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SuggestionStore for SqliteSuggestionStore {
    async fn insert_suggestion(&self, record: &SuggestionRecord) -> Result<(), SuggestionError> {
        sqlx::query(
            r#"
            INSERT INTO suggestions (author_id, date, description)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(record.author_id as i64)
        .bind(record.date.to_rfc3339())
        .bind(&record.description)
        .execute(&self.pool)
        .await
        .map_err(|e| SuggestionError::StorageError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::Row;

    #[tokio::test]
    async fn suggestions_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("community.db").display()
        );
        let pool = SqlitePoolOptions::new().connect(&url).await.unwrap();
        let store = SqliteSuggestionStore::new(pool.clone());
        store.migrate().await.unwrap();

        let record = SuggestionRecord {
            author_id: 42,
            date: Utc::now(),
            description: "Add a study-group channel".to_string(),
        };
        // Same suggestion twice: no uniqueness beyond the row id
        store.insert_suggestion(&record).await.unwrap();
        store.insert_suggestion(&record).await.unwrap();

        let rows = sqlx::query("SELECT author_id, date, description FROM suggestions ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        let row = &rows[0];
        assert_eq!(row.get::<i64, _>("author_id"), 42);
        assert_eq!(row.get::<String, _>("description"), "Add a study-group channel");
        let date: String = row.get("date");
        let parsed = DateTime::parse_from_rfc3339(&date).unwrap();
        assert_eq!(parsed.timestamp(), record.date.timestamp());
    }
}
