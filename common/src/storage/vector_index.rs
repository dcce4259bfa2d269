use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;

use super::db::SurrealDbClient;

/// Where a chunk came from. `byte_start..byte_end` are byte offsets into the
/// extracted document text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub document_id: String,
    pub chunk_index: usize,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// One row of the vector collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedEntry {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity, higher is closer.
    pub score: f32,
}

/// Handle to the shared chunk collection. Every query is scoped to one document.
#[derive(Clone)]
pub struct VectorIndex {
    db: Arc<SurrealDbClient>,
    collection: String,
}

impl VectorIndex {
    pub fn new(db: Arc<SurrealDbClient>, collection: impl Into<String>) -> Result<Self, AppError> {
        let collection = collection.into();
        if !is_valid_identifier(&collection) {
            return Err(AppError::Validation(format!(
                "invalid vector collection name: {collection:?}"
            )));
        }

        Ok(Self { db, collection })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn ensure_initialized(&self) -> Result<(), AppError> {
        let query = format!(
            "DEFINE TABLE IF NOT EXISTS {c} SCHEMALESS;
             DEFINE INDEX IF NOT EXISTS idx_{c}_document ON TABLE {c} FIELDS metadata.document_id;",
            c = self.collection
        );

        self.db.client.query(query).await?.check()?;

        Ok(())
    }

    /// Writes all entries atomically. Either every entry lands or none do.
    pub async fn insert(&self, entries: Vec<IndexedEntry>) -> Result<(), AppError> {
        if entries.is_empty() {
            return Ok(());
        }

        let count = entries.len();
        let query = format!(
            "BEGIN TRANSACTION;
             INSERT INTO {} $entries;
             COMMIT TRANSACTION;",
            self.collection
        );

        self.db
            .client
            .query(query)
            .bind(("entries", entries))
            .await?
            .check()?;

        debug!(collection = %self.collection, count, "inserted chunk entries");

        Ok(())
    }

    /// Top-`k` chunks of `document_id` by cosine similarity, best first.
    ///
    /// The document filter is applied before ranking, so chunks of other
    /// documents can never crowd out the requested one.
    pub async fn search(
        &self,
        document_id: &str,
        embedding: Vec<f32>,
        k: usize,
    ) -> Result<Vec<SearchHit>, AppError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT text, metadata, vector::similarity::cosine(embedding, $embedding) AS score
             FROM {}
             WHERE metadata.document_id = $document_id
             ORDER BY score DESC
             LIMIT {k}",
            self.collection
        );

        let hits: Vec<SearchHit> = self
            .db
            .client
            .query(query)
            .bind(("embedding", embedding))
            .bind(("document_id", document_id.to_owned()))
            .await?
            .take(0)?;

        Ok(hits)
    }

    pub async fn count_for_document(&self, document_id: &str) -> Result<usize, AppError> {
        #[derive(Deserialize)]
        struct CountRow {
            count: usize,
        }

        let query = format!(
            "SELECT count() AS count FROM {} WHERE metadata.document_id = $document_id GROUP ALL",
            self.collection
        );

        let row: Option<CountRow> = self
            .db
            .client
            .query(query)
            .bind(("document_id", document_id.to_owned()))
            .await?
            .take(0)?;

        Ok(row.map_or(0, |row| row.count))
    }

    /// Round trip against the collection, used by readiness probes.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.db
            .client
            .query(format!("INFO FOR TABLE {}", self.collection))
            .await?
            .check()?;
        Ok(())
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn setup_index() -> VectorIndex {
        let database = Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory("test_ns", &database)
            .await
            .expect("Failed to start in-memory surrealdb");
        let index = VectorIndex::new(Arc::new(db), "documents").expect("valid collection");
        index.ensure_initialized().await.expect("init collection");
        index
    }

    fn entry(document_id: &str, chunk_index: usize, text: &str, embedding: Vec<f32>) -> IndexedEntry {
        IndexedEntry {
            text: text.to_string(),
            metadata: ChunkMetadata {
                document_id: document_id.to_string(),
                chunk_index,
                byte_start: chunk_index * 100,
                byte_end: chunk_index * 100 + text.len(),
            },
            embedding,
        }
    }

    #[test]
    fn rejects_unsafe_collection_names() {
        assert!(is_valid_identifier("documents"));
        assert!(is_valid_identifier("_chunks_2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2docs"));
        assert!(!is_valid_identifier("docs; REMOVE TABLE user"));
    }

    #[tokio::test]
    async fn search_orders_by_similarity() {
        let index = setup_index().await;
        index
            .insert(vec![
                entry("1", 0, "far", vec![0.0, 1.0, 0.0]),
                entry("1", 1, "near", vec![1.0, 0.0, 0.0]),
                entry("1", 2, "middle", vec![0.7, 0.7, 0.0]),
            ])
            .await
            .expect("insert");

        let hits = index
            .search("1", vec![1.0, 0.0, 0.0], 2)
            .await
            .expect("search");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "near");
        assert_eq!(hits[1].text, "middle");
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].metadata.chunk_index, 1);
    }

    #[tokio::test]
    async fn search_never_crosses_documents() {
        let index = setup_index().await;
        let mut entries = Vec::new();
        // Document 2 holds many chunks that match the query perfectly.
        for i in 0..20 {
            entries.push(entry("2", i, "other document", vec![1.0, 0.0]));
        }
        entries.push(entry("1", 0, "requested document", vec![0.0, 1.0]));
        index.insert(entries).await.expect("insert");

        let hits = index.search("1", vec![1.0, 0.0], 6).await.expect("search");

        assert_eq!(hits.len(), 1);
        assert!(hits.iter().all(|hit| hit.metadata.document_id == "1"));
        assert_eq!(hits[0].text, "requested document");
    }

    #[tokio::test]
    async fn zero_k_and_unknown_document_return_nothing() {
        let index = setup_index().await;
        index
            .insert(vec![entry("1", 0, "text", vec![1.0, 0.0])])
            .await
            .expect("insert");

        assert!(index.search("1", vec![1.0, 0.0], 0).await.unwrap().is_empty());
        assert!(index
            .search("missing", vec![1.0, 0.0], 5)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn counts_entries_per_document() {
        let index = setup_index().await;
        assert_eq!(index.count_for_document("1").await.unwrap(), 0);

        index
            .insert(vec![
                entry("1", 0, "a", vec![1.0]),
                entry("1", 1, "b", vec![1.0]),
                entry("2", 0, "c", vec![1.0]),
            ])
            .await
            .expect("insert");

        assert_eq!(index.count_for_document("1").await.unwrap(), 2);
        assert_eq!(index.count_for_document("2").await.unwrap(), 1);
        assert_eq!(index.collection(), "documents");
    }

    #[tokio::test]
    async fn empty_insert_is_noop() {
        let index = setup_index().await;
        index.insert(Vec::new()).await.expect("empty insert");
        assert_eq!(index.count_for_document("1").await.unwrap(), 0);
    }
}
