use async_trait::async_trait;
use serde_json::Value;
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::info;

use super::{assign_id, matches_all, Collection, DocumentStore, Patch, Predicate, StoreError};

/// Document store on SQLite. Each document is one row of the `documents`
/// table with its JSON body; predicates are evaluated after loading the
/// collection.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect, creating the database file and running migrations when asked
    pub async fn connect(database_url: &str, auto_migrate: bool) -> Result<Self, StoreError> {
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }
}

fn not_found(collection: Collection, id: &str) -> StoreError {
    StoreError::NotFound {
        collection,
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, collection: Collection, mut document: Value) -> Result<String, StoreError> {
        let id = assign_id(&mut document)?;
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(serde_json::to_string(&document)?)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn patch(&self, collection: Collection, id: &str, patch: &Patch) -> Result<(), StoreError> {
        // Read-modify-write inside one transaction keeps appends atomic
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found(collection, id))?;

        let body: String = row.get("body");
        let mut document: Value = serde_json::from_str(&body)?;
        patch.apply_to(&mut document)?;

        sqlx::query(
            r#"
            UPDATE documents SET body = ?3, updated_at = datetime('now')
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(serde_json::to_string(&document)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = ?1 ORDER BY created_at ASC")
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let body: String = row.get("body");
            let document: Value = serde_json::from_str(&body)?;
            if matches_all(&document, predicates) {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn close(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> SqliteStore {
        let url = format!("sqlite://{}", dir.path().join("casedesk.db").display());
        SqliteStore::connect(&url, true).await.unwrap()
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        let id = store
            .create(Collection::Cases, json!({"name": "Asha", "mainLogs": []}))
            .await
            .unwrap();

        let mut patch = Patch::new();
        patch
            .set("name", json!("Asha Rao"))
            .append("mainLogs", json!({"remark": "hello"}));
        store.patch(Collection::Cases, &id, &patch).await.unwrap();

        let doc = store.get(Collection::Cases, &id).await.unwrap().unwrap();
        assert_eq!(doc["name"], "Asha Rao");
        assert_eq!(doc["mainLogs"][0]["remark"], "hello");

        let hits = store
            .query(Collection::Cases, &[Predicate::equals("name", "Asha Rao")])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        store.delete(Collection::Cases, &id).await.unwrap();
        assert!(store.get(Collection::Cases, &id).await.unwrap().is_none());

        store.close().await;
        assert!(store.get(Collection::Cases, &id).await.is_err());
    }

    #[tokio::test]
    async fn patching_missing_document_fails() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        assert!(matches!(
            store.patch(Collection::Partners, "missing", &Patch::new()).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
