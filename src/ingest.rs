//! # Ingestion Module
//!
//! ## Purpose
//! Populates the document store from a directory of per-act text files,
//! writing one record per non-empty page with inferred act metadata and
//! precomputed keywords.
//!
//! ## Input/Output Specification
//! - **Input**: Directory of `.txt` files, one per act, pages separated by
//!   form-feed characters (the delimiter `pdftotext` emits)
//! - **Output**: One `StoredDocument` per non-empty page
//! - **Metadata**: Act name inferred from the file name, 1-based page
//!   numbers, "{act} - Page {n}" titles
//!
//! PDF-to-text extraction itself is out of scope; run the source PDFs through
//! an extractor first and point this pipeline at the output.

use crate::config::IngestionConfig;
use crate::errors::{Result, SearchError};
use crate::keywords::KeywordExtractor;
use crate::store::{DocumentStore, StoredDocument};
use chrono::Utc;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Page delimiter emitted by pdftotext between pages
const PAGE_DELIMITER: char = '\u{000C}';

/// Ingestion pipeline writing act pages into the store
pub struct IngestionPipeline {
    config: IngestionConfig,
    store: Arc<dyn DocumentStore>,
    extractor: KeywordExtractor,
}

/// Counters reported after an ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestionStats {
    /// Files processed
    pub files: usize,
    /// Pages written to the store
    pub pages_written: usize,
    /// Empty pages skipped
    pub pages_skipped: usize,
}

impl IngestionPipeline {
    /// Create a new pipeline over the given store
    pub fn new(config: IngestionConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store,
            extractor: KeywordExtractor::new(),
        }
    }

    /// Ingest every `.txt` file in `dir`
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IngestionStats> {
        if !dir.is_dir() {
            return Err(SearchError::Ingestion {
                file: dir.display().to_string(),
                details: "not a directory".to_string(),
            });
        }

        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
            })
            .collect();
        entries.sort();

        let mut stats = IngestionStats::default();
        for path in entries {
            let file_stats = self.ingest_act_file(&path).await?;
            stats.files += 1;
            stats.pages_written += file_stats.pages_written;
            stats.pages_skipped += file_stats.pages_skipped;
        }

        self.store.flush().await?;
        tracing::info!(
            "Ingestion done: {} files, {} pages written, {} empty pages skipped",
            stats.files,
            stats.pages_written,
            stats.pages_skipped,
        );
        Ok(stats)
    }

    /// Ingest one act file, one store record per non-empty page
    pub async fn ingest_act_file(&self, path: &Path) -> Result<IngestionStats> {
        let act_name = infer_act_name(path);
        tracing::info!("Ingesting: {:?} ({})", path, act_name);

        let text = std::fs::read_to_string(path).map_err(|e| SearchError::Ingestion {
            file: path.display().to_string(),
            details: e.to_string(),
        })?;

        let mut stats = IngestionStats {
            files: 1,
            ..IngestionStats::default()
        };

        for (index, page_text) in text.split(PAGE_DELIMITER).enumerate() {
            let page_no = index as u32 + 1;
            if page_text.trim().is_empty() {
                stats.pages_skipped += 1;
                continue;
            }

            let doc = StoredDocument {
                id: Uuid::new_v4(),
                act_name: Some(act_name.clone()),
                title: Some(format!("{} - Page {}", act_name, page_no)),
                page_no: Some(page_no),
                text: page_text.to_string(),
                keywords: self
                    .extractor
                    .extract(page_text, self.config.document_keyword_limit),
                ingested_at: Utc::now(),
            };
            self.store.put_document(&doc).await?;
            stats.pages_written += 1;
            tracing::debug!("Saved page {} of {}", page_no, act_name);
        }

        Ok(stats)
    }
}

/// Infer a human-readable act name from a file name, stripping filing noise
/// like "bare act" or "copy" suffixes and separator runs.
pub fn infer_act_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let noise = Regex::new(r"(?i)(bare act|copy|pdf)").expect("valid noise pattern");
    let separators = Regex::new(r"[_\-]+").expect("valid separator pattern");
    let spaces = Regex::new(r"\s+").expect("valid whitespace pattern");

    let cleaned = noise.replace_all(stem, "");
    let cleaned = separators.replace_all(&cleaned, " ");
    let cleaned = spaces.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        stem.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::MemoryStore;
    use futures::StreamExt;
    use std::io::Write;

    #[test]
    fn act_name_strips_noise_and_separators() {
        assert_eq!(
            infer_act_name(Path::new("Indian-Penal-Code_bare act.txt")),
            "Indian Penal Code"
        );
        assert_eq!(
            infer_act_name(Path::new("IT_Act_2000_copy.txt")),
            "IT Act 2000"
        );
        assert_eq!(infer_act_name(Path::new("dpdp.txt")), "dpdp");
    }

    #[test]
    fn all_noise_name_falls_back_to_the_stem() {
        assert_eq!(infer_act_name(Path::new("copy.txt")), "copy");
    }

    #[tokio::test]
    async fn writes_one_record_per_non_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("IT_Act.txt")).unwrap();
        write!(
            file,
            "Penalty for damage to computer systems.\u{000C}\n  \u{000C}Compensation for failure to protect data."
        )
        .unwrap();

        let store = Arc::new(MemoryStore::new(Vec::new()));
        let pipeline = IngestionPipeline::new(IngestionConfig::default(), store.clone());
        let stats = pipeline.ingest_directory(dir.path()).await.unwrap();

        assert_eq!(stats.files, 1);
        assert_eq!(stats.pages_written, 2);
        assert_eq!(stats.pages_skipped, 1);

        let docs: Vec<_> = store
            .stream_documents()
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(docs.len(), 2);
        let page_three = docs.iter().find(|d| d.page_no == Some(3)).unwrap();
        assert_eq!(page_three.act_name.as_deref(), Some("IT Act"));
        assert_eq!(page_three.title.as_deref(), Some("IT Act - Page 3"));
        assert!(page_three.keywords.contains(&"compensation".to_string()));
    }

    #[tokio::test]
    async fn document_keywords_respect_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let words: Vec<String> = (0..30).map(|i| format!("keyword{:02}word", i)).collect();
        std::fs::write(dir.path().join("big.txt"), words.join(" ")).unwrap();

        let store = Arc::new(MemoryStore::new(Vec::new()));
        let pipeline = IngestionPipeline::new(IngestionConfig::default(), store.clone());
        pipeline.ingest_directory(dir.path()).await.unwrap();

        let docs: Vec<_> = store
            .stream_documents()
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(docs[0].keywords.len(), 10);
    }

    #[tokio::test]
    async fn non_txt_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("act.pdf"), "binary").unwrap();

        let store = Arc::new(MemoryStore::new(Vec::new()));
        let pipeline = IngestionPipeline::new(IngestionConfig::default(), store.clone());
        let stats = pipeline.ingest_directory(dir.path()).await.unwrap();
        assert_eq!(stats.files, 0);
        assert_eq!(stats.pages_written, 0);
    }

    #[tokio::test]
    async fn missing_directory_is_an_ingestion_error() {
        let store = Arc::new(MemoryStore::new(Vec::new()));
        let pipeline = IngestionPipeline::new(IngestionConfig::default(), store);
        let err = pipeline
            .ingest_directory(Path::new("./does-not-exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Ingestion { .. }));
    }
}
