use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};
use uuid::Uuid;

stored_object!(Document, "document", {
    user_id: String,
    filename: String,
    /// Location inside the file store.
    file_path: String,
    sha256: String,
    #[serde(default)]
    chunk_count: usize
});

impl Document {
    pub fn new(user_id: String, filename: String, file_path: String, sha256: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            user_id,
            filename,
            file_path,
            sha256,
            chunk_count: 0,
        }
    }

    /// All documents of a user, newest first.
    pub async fn list_for_user(user_id: &str, db: &SurrealDbClient) -> Result<Vec<Self>, AppError> {
        db.list_owned_items(user_id, None).await
    }

    pub async fn set_chunk_count(
        id: &str,
        chunk_count: usize,
        db: &SurrealDbClient,
    ) -> Result<(), AppError> {
        db.client
            .query(
                "UPDATE type::thing($table, $id) SET chunk_count = $chunk_count, updated_at = $updated_at",
            )
            .bind(("table", Self::table_name()))
            .bind(("id", id.to_owned()))
            .bind(("chunk_count", chunk_count))
            .bind(("updated_at", surrealdb::Datetime::from(Utc::now())))
            .await?
            .check()?;

        Ok(())
    }

    pub async fn get_owned(id: &str, user_id: &str, db: &SurrealDbClient) -> Result<Self, AppError> {
        db.get_owned_item(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".into()))
    }

    /// Removes the record if `user_id` owns it and hands it back.
    ///
    /// Indexed chunks of the document are left in the vector collection.
    pub async fn delete_owned(
        id: &str,
        user_id: &str,
        db: &SurrealDbClient,
    ) -> Result<Self, AppError> {
        let document = Self::get_owned(id, user_id, db).await?;

        db.delete_owned_item::<Self>(id, user_id).await?;

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SurrealDbClient {
        let database = Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory("test_ns", &database)
            .await
            .expect("Failed to start in-memory surrealdb");
        db.ensure_initialized()
            .await
            .expect("Failed to initialize schema");
        db
    }

    fn document(user_id: &str, filename: &str) -> Document {
        Document::new(
            user_id.to_string(),
            filename.to_string(),
            format!("{user_id}/{filename}"),
            "deadbeef".to_string(),
        )
    }

    #[tokio::test]
    async fn test_list_newest_first_and_scoped_to_user() {
        let db = setup_test_db().await;

        let mut older = document("user-1", "older.pdf");
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        let newer = document("user-1", "newer.pdf");
        let foreign = document("user-2", "foreign.pdf");

        db.store_item(older).await.expect("store older");
        db.store_item(newer).await.expect("store newer");
        db.store_item(foreign).await.expect("store foreign");

        let docs = Document::list_for_user("user-1", &db).await.expect("list");
        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["newer.pdf", "older.pdf"]);
    }

    #[tokio::test]
    async fn test_record_round_trip_keeps_plain_id() {
        let db = setup_test_db().await;
        let doc = document("user-1", "notes.pdf");
        let id = doc.id.clone();

        let stored = db
            .store_item(doc)
            .await
            .expect("store")
            .expect("created record");
        assert_eq!(stored.id, id);

        let fetched: Document = db.get_item(&id).await.expect("get").expect("exists");
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.filename, "notes.pdf");
        assert_eq!(fetched.sha256, "deadbeef");

        let owned = Document::get_owned(&id, "user-1", &db)
            .await
            .expect("owner read");
        assert_eq!(owned.id, id);
    }

    #[tokio::test]
    async fn test_set_chunk_count() {
        let db = setup_test_db().await;
        let doc = document("user-1", "a.pdf");
        let id = doc.id.clone();
        db.store_item(doc).await.expect("store");

        Document::set_chunk_count(&id, 7, &db).await.expect("update");

        let stored: Document = db.get_item(&id).await.expect("get").expect("exists");
        assert_eq!(stored.chunk_count, 7);
    }

    #[tokio::test]
    async fn test_delete_owned_checks_owner() {
        let db = setup_test_db().await;
        let doc = document("user-1", "a.pdf");
        let id = doc.id.clone();
        db.store_item(doc).await.expect("store");

        let wrong_owner = Document::delete_owned(&id, "user-2", &db).await;
        assert!(matches!(wrong_owner, Err(AppError::NotFound(_))));

        let removed = Document::delete_owned(&id, "user-1", &db)
            .await
            .expect("owner delete");
        assert_eq!(removed.filename, "a.pdf");

        let gone: Option<Document> = db.get_item(&id).await.expect("get");
        assert!(gone.is_none());
    }
}
