use crate::error::AppError;

use super::types::StoredObject;
use std::ops::Deref;
use surrealdb::{
    engine::any::{connect, Any},
    opt::auth::Root,
    Error, Surreal,
};

#[derive(Clone)]
pub struct SurrealDbClient {
    pub client: Surreal<Any>,
}

impl SurrealDbClient {
    /// # Initialize a new database client
    ///
    /// Embedded engines (`surrealkv://`, `mem://`) run without authentication,
    /// so an empty username skips the root sign-in.
    pub async fn new(
        address: &str,
        username: &str,
        password: &str,
        namespace: &str,
        database: &str,
    ) -> Result<Self, Error> {
        let db = connect(address).await?;

        if !username.is_empty() {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }

    /// Defines the record tables and their lookup indexes. Idempotent.
    pub async fn ensure_initialized(&self) -> Result<(), AppError> {
        self.client
            .query(
                "DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS idx_user_username ON TABLE user FIELDS username UNIQUE;
                 DEFINE TABLE IF NOT EXISTS document SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS idx_document_user ON TABLE document FIELDS user_id;
                 DEFINE TABLE IF NOT EXISTS flashcard_set SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS idx_flashcard_set_owner ON TABLE flashcard_set FIELDS user_id, document_id;
                 DEFINE TABLE IF NOT EXISTS quiz SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS idx_quiz_owner ON TABLE quiz FIELDS user_id, document_id;",
            )
            .await?
            .check()?;

        Ok(())
    }

    /// Operation to store a object in SurrealDB, requires the struct to implement StoredObject
    pub async fn store_item<T>(&self, item: T) -> Result<Option<T>, Error>
    where
        T: StoredObject + Send + Sync + 'static,
    {
        self.client
            .create((T::table_name(), item.get_id()))
            .content(item)
            .await
    }

    /// Operation to retrieve a single object by its ID
    pub async fn get_item<T>(&self, id: &str) -> Result<Option<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.select((T::table_name(), id)).await
    }

    /// Operation to delete a single object by its ID
    pub async fn delete_item<T>(&self, id: &str) -> Result<Option<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.delete((T::table_name(), id)).await
    }

    /// Fetches a record only when it belongs to `user_id`.
    pub async fn get_owned_item<T>(&self, id: &str, user_id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> StoredObject,
    {
        let item: Option<T> = self
            .client
            .query("SELECT * FROM type::thing($table, $id) WHERE user_id = $user_id")
            .bind(("table", T::table_name()))
            .bind(("id", id.to_owned()))
            .bind(("user_id", user_id.to_owned()))
            .await?
            .take(0)?;

        Ok(item)
    }

    /// Deletes a record owned by `user_id`. Returns whether anything was removed.
    pub async fn delete_owned_item<T>(&self, id: &str, user_id: &str) -> Result<bool, AppError>
    where
        T: for<'de> StoredObject,
    {
        let deleted: Vec<T> = self
            .client
            .query("DELETE type::thing($table, $id) WHERE user_id = $user_id RETURN BEFORE")
            .bind(("table", T::table_name()))
            .bind(("id", id.to_owned()))
            .bind(("user_id", user_id.to_owned()))
            .await?
            .take(0)?;

        Ok(!deleted.is_empty())
    }

    /// Lists a user's records, newest first, optionally narrowed to one document.
    pub async fn list_owned_items<T>(
        &self,
        user_id: &str,
        document_id: Option<&str>,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> StoredObject,
    {
        let query = if document_id.is_some() {
            "SELECT * FROM type::table($table) WHERE user_id = $user_id AND document_id = $document_id ORDER BY created_at DESC"
        } else {
            "SELECT * FROM type::table($table) WHERE user_id = $user_id ORDER BY created_at DESC"
        };

        let items: Vec<T> = self
            .client
            .query(query)
            .bind(("table", T::table_name()))
            .bind(("user_id", user_id.to_owned()))
            .bind(("document_id", document_id.map(str::to_owned)))
            .await?
            .take(0)?;

        Ok(items)
    }
}

impl Deref for SurrealDbClient {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SurrealDbClient {
    /// Create an in-memory SurrealDB client for testing.
    pub async fn memory(namespace: &str, database: &str) -> Result<Self, Error> {
        let db = connect("mem://").await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }
}
