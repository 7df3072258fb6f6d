//! # Document Store Module
//!
//! ## Purpose
//! Persistent storage of ingested act pages behind a narrow read-mostly
//! interface: the retrieval core only ever streams documents out of a named
//! collection, and the ingestion pipeline only ever writes them in.
//!
//! ## Input/Output Specification
//! - **Input**: Stored act pages (ingestion), stream requests (search)
//! - **Output**: A lazy, order-unspecified, possibly-failing stream of
//!   `StoredDocument` records
//! - **Storage**: Sled embedded database, bincode-encoded records, optional
//!   gzip compression
//!
//! ## Key Features
//! - `DocumentStore` trait so the scanner never depends on the backing engine
//! - Restartable per-call streaming with a distinct mid-stream error signal
//! - Health check probing an isolated scratch tree
//!
//! Records are loosely shaped on the way out: everything except the page text
//! may be absent, and consumers must cope rather than fail.

use crate::config::StoreConfig;
use crate::errors::{Result, SearchError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted page of one legal act. Created at ingestion time and
/// immutable afterwards from the retrieval core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Storage key
    pub id: Uuid,
    /// Act the page belongs to, when known
    pub act_name: Option<String>,
    /// Display title, typically "{act} - Page {n}"
    pub title: Option<String>,
    /// 1-based page number; ingestion always writes one, but externally
    /// produced records may lack it
    pub page_no: Option<u32>,
    /// Full extracted page text
    pub text: String,
    /// Ingestion-time keywords. Not consulted by the retrieval core, which
    /// recomputes keywords from the live query only.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}

/// Store statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_documents: usize,
    pub database_size_bytes: u64,
}

/// A lazy sequence of documents. Iteration order is the store's own and
/// carries no meaning; any element may be an error, at which point the
/// consumer must abandon the stream.
pub type DocumentStream = BoxStream<'static, Result<StoredDocument>>;

/// Read/write interface to the document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stream every document in the collection, in store order.
    /// Each call restarts from the beginning.
    fn stream_documents(&self) -> DocumentStream;

    /// Persist one document
    async fn put_document(&self, doc: &StoredDocument) -> Result<()>;

    /// Flush pending writes to durable storage
    async fn flush(&self) -> Result<()>;

    /// Verify the store is reachable and writable
    async fn health_check(&self) -> Result<()>;

    /// Get store statistics
    async fn stats(&self) -> Result<StoreStats>;
}

/// Sled-backed document store
pub struct SledDocumentStore {
    config: StoreConfig,
    db: sled::Db,
    tree: sled::Tree,
}

impl SledDocumentStore {
    /// Open (or create) the database and its act-page collection
    pub fn new(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = sled::open(&config.db_path)?;
        let tree = db.open_tree(config.collection.as_bytes())?;

        tracing::info!(
            "Document store opened at {:?} ({} documents in '{}')",
            config.db_path,
            tree.len(),
            config.collection
        );

        Ok(Self {
            config: config.clone(),
            db,
            tree,
        })
    }

    fn encode(&self, doc: &StoredDocument) -> Result<Vec<u8>> {
        let raw = bincode::serialize(doc)?;
        if self.config.enable_compression {
            compress(&raw)
        } else {
            Ok(raw)
        }
    }
}

#[async_trait]
impl DocumentStore for SledDocumentStore {
    fn stream_documents(&self) -> DocumentStream {
        let compressed = self.config.enable_compression;
        let iter = self.tree.iter().map(move |entry| match entry {
            Ok((_, value)) => decode_document(&value, compressed),
            Err(e) => Err(SearchError::StoreUnavailable {
                details: format!("read failed mid-stream: {}", e),
            }),
        });
        Box::pin(stream::iter(iter))
    }

    async fn put_document(&self, doc: &StoredDocument) -> Result<()> {
        let value = self.encode(doc)?;
        self.tree.insert(doc.id.as_bytes(), value)?;
        tracing::debug!(
            "Stored page {:?} of {:?} ({} bytes)",
            doc.page_no,
            doc.act_name,
            doc.text.len()
        );
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        // Probe a scratch tree so health traffic never shows up in scans.
        let probe = self.db.open_tree(b"health_check")?;
        probe.insert(b"probe", b"ok".to_vec())?;
        let read_back = probe.get(b"probe")?;
        probe.remove(b"probe")?;

        if read_back.is_none() {
            return Err(SearchError::StoreUnavailable {
                details: "health probe value not found after write".to_string(),
            });
        }
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            total_documents: self.tree.len(),
            database_size_bytes: self.db.size_on_disk()?,
        })
    }
}

fn decode_document(value: &[u8], compressed: bool) -> Result<StoredDocument> {
    let raw = if compressed {
        decompress(value)?
    } else {
        value.to_vec()
    };
    bincode::deserialize(&raw).map_err(|e| SearchError::StoreUnavailable {
        details: format!("corrupt record: {}", e),
    })
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    use std::io::Write;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| SearchError::StoreUnavailable {
            details: format!("failed to decompress record: {}", e),
        })?;
    Ok(out)
}

#[cfg(test)]
pub(crate) mod testutil {
    //! In-memory stores for exercising the scanner without a database.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Build a minimal act page for tests
    pub(crate) fn page(act: &str, page_no: u32, text: &str) -> StoredDocument {
        StoredDocument {
            id: Uuid::new_v4(),
            act_name: Some(act.to_string()),
            title: Some(format!("{} - Page {}", act, page_no)),
            page_no: Some(page_no),
            text: text.to_string(),
            keywords: Vec::new(),
            ingested_at: Utc::now(),
        }
    }

    /// Store over a vector of documents, counting every document actually
    /// handed to a consumer and optionally failing mid-stream.
    pub(crate) struct MemoryStore {
        docs: Arc<Mutex<Vec<StoredDocument>>>,
        reads: Arc<AtomicUsize>,
        fail_after: Option<usize>,
    }

    impl MemoryStore {
        pub(crate) fn new(docs: Vec<StoredDocument>) -> Self {
            Self {
                docs: Arc::new(Mutex::new(docs)),
                reads: Arc::new(AtomicUsize::new(0)),
                fail_after: None,
            }
        }

        /// Yield `n` documents successfully, then fail every further read
        pub(crate) fn failing_after(docs: Vec<StoredDocument>, n: usize) -> Self {
            Self {
                fail_after: Some(n),
                ..Self::new(docs)
            }
        }

        /// Number of documents the store has handed out across all streams
        pub(crate) fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        fn stream_documents(&self) -> DocumentStream {
            let docs = self.docs.lock().unwrap().clone();
            let reads = self.reads.clone();
            let fail_after = self.fail_after;
            let iter = docs.into_iter().enumerate().map(move |(i, doc)| {
                if let Some(n) = fail_after {
                    if i >= n {
                        return Err(SearchError::StoreUnavailable {
                            details: "injected stream failure".to_string(),
                        });
                    }
                }
                reads.fetch_add(1, Ordering::SeqCst);
                Ok(doc)
            });
            Box::pin(stream::iter(iter))
        }

        async fn put_document(&self, doc: &StoredDocument) -> Result<()> {
            self.docs.lock().unwrap().push(doc.clone());
            Ok(())
        }

        async fn flush(&self) -> Result<()> {
            Ok(())
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn stats(&self) -> Result<StoreStats> {
            Ok(StoreStats {
                total_documents: self.docs.lock().unwrap().len(),
                database_size_bytes: 0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::page;
    use super::*;
    use futures::StreamExt;

    fn temp_store(compress: bool) -> (tempfile::TempDir, SledDocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_path: dir.path().join("acts.db"),
            collection: "acts".to_string(),
            enable_compression: compress,
        };
        let store = SledDocumentStore::new(&config).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn roundtrips_documents_through_sled() {
        let (_dir, store) = temp_store(false);
        let doc = page("IT Act", 5, "penalty for breach of contract");
        store.put_document(&doc).await.unwrap();

        let docs: Vec<_> = store
            .stream_documents()
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, doc.text);
        assert_eq!(docs[0].page_no, Some(5));
        assert_eq!(docs[0].act_name.as_deref(), Some("IT Act"));
    }

    #[tokio::test]
    async fn compression_roundtrip_preserves_text() {
        let (_dir, store) = temp_store(true);
        let text = "whoever contravenes this provision shall be liable".repeat(50);
        store.put_document(&page("DPDP Act", 1, &text)).await.unwrap();

        let docs: Vec<_> = store
            .stream_documents()
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(docs[0].text, text);
    }

    #[tokio::test]
    async fn health_probe_does_not_pollute_scans() {
        let (_dir, store) = temp_store(false);
        store.health_check().await.unwrap();
        assert_eq!(store.stats().await.unwrap().total_documents, 0);
    }

    #[tokio::test]
    async fn stats_counts_documents() {
        let (_dir, store) = temp_store(false);
        for n in 1..=3 {
            store.put_document(&page("IPC", n, "text")).await.unwrap();
        }
        store.flush().await.unwrap();
        assert_eq!(store.stats().await.unwrap().total_documents, 3);
    }
}
