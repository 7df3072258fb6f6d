//! # Search Engine Module
//!
//! ## Purpose
//! Core retrieval pipeline: extracts keywords from a query, streams the
//! document store under a scan budget, scores each page, then ranks and
//! truncates the candidates into bounded result snippets.
//!
//! ## Input/Output Specification
//! - **Input**: Free-text query
//! - **Output**: Ranked search results with provenance and snippets, plus the
//!   keyword set the ranking was based on
//! - **Budgets**: `scan_budget` caps documents visited per call regardless of
//!   corpus size; `result_budget` caps results returned regardless of match
//!   count
//!
//! ## Key Features
//! - Empty keyword sets short-circuit without touching the store
//! - Naive term-hit scoring: one point per distinct matching keyword
//! - Deterministic total order (score desc, page asc) with stable ties
//! - Whole-call failure on store errors, never partial results
//!
//! A single search call is one sequential, cooperative task: documents are
//! pulled and evaluated one at a time, with no fan-out across documents and
//! no locking (stored pages are read-only here). Concurrent calls are
//! independent full scans against the shared store.

use crate::config::SearchConfig;
use crate::errors::Result;
use crate::keywords::KeywordExtractor;
use crate::store::{DocumentStore, StoredDocument};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;

/// Main search engine
pub struct SearchEngine {
    limits: SearchConfig,
    store: Arc<dyn DocumentStore>,
    extractor: KeywordExtractor,
}

/// One ranked match: provenance copied verbatim from the stored page (any of
/// it may be absent) plus a bounded snippet and the match score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub act_name: Option<String>,
    pub title: Option<String>,
    pub page_no: Option<u32>,
    /// Verbatim prefix of the page text. Deliberately not word-boundary
    /// aware; it may end mid-word.
    pub snippet: String,
    /// Count of distinct query keywords found in the page text
    pub score: u32,
}

/// Outcome of one search call. `keywords` is populated even when `results`
/// is empty so callers can explain why nothing matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub query: String,
    pub keywords: Vec<String>,
    pub results: Vec<SearchHit>,
}

/// Score a page against a keyword set: the count of keywords that occur at
/// least once as a case-insensitive substring of the text. Repetition does
/// not raise the score.
pub fn score_document(text: &str, keywords: &[String]) -> u32 {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|kw| lowered.contains(kw.as_str()))
        .count() as u32
}

/// Order candidates by score descending, then page number ascending with a
/// missing page treated as page 0, and truncate to the result budget. The
/// sort is stable, so exact (score, page) ties keep their scan order. The
/// page tie-break keeps output deterministic across runs; it is not a
/// relevance signal.
pub fn rank(mut candidates: Vec<SearchHit>, result_budget: usize) -> Vec<SearchHit> {
    candidates.sort_by_key(|hit| (Reverse(hit.score), hit.page_no.unwrap_or(0)));
    candidates.truncate(result_budget);
    candidates
}

fn shape_hit(doc: &StoredDocument, score: u32, snippet_chars: usize) -> SearchHit {
    SearchHit {
        act_name: doc.act_name.clone(),
        title: doc.title.clone(),
        page_no: doc.page_no,
        snippet: doc.text.chars().take(snippet_chars).collect(),
        score,
    }
}

impl SearchEngine {
    /// Create a new search engine over the given store
    pub fn new(limits: SearchConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            limits,
            store,
            extractor: KeywordExtractor::new(),
        }
    }

    /// Run one search call end to end
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let keywords = self
            .extractor
            .extract(query, self.limits.query_keyword_limit);
        tracing::info!("Search query='{}' -> keywords={:?}", query, keywords);

        // No usable keywords means no match is possible; answer immediately
        // instead of scanning the whole corpus against nothing.
        if keywords.is_empty() {
            return Ok(SearchOutcome {
                query: query.to_string(),
                keywords,
                results: Vec::new(),
            });
        }

        let (candidates, scanned) = self.scan(&keywords).await?;
        let matched = candidates.len();
        let results = rank(candidates, self.limits.result_budget);

        tracing::info!(
            "Search done: query='{}', scanned={}, matched={}, returned={}",
            query,
            scanned,
            matched,
            results.len(),
        );

        Ok(SearchOutcome {
            query: query.to_string(),
            keywords,
            results,
        })
    }

    /// Stream the store and collect scoring candidates under the scan budget.
    ///
    /// The budget caps documents visited, not results collected: streaming
    /// stops outright once the visit counter passes it, even if more
    /// documents remain. A read failure mid-stream aborts the whole call and
    /// discards whatever was collected.
    async fn scan(&self, keywords: &[String]) -> Result<(Vec<SearchHit>, usize)> {
        let mut stream = self.store.stream_documents();
        let mut visited = 0usize;
        let mut candidates = Vec::new();

        while let Some(entry) = stream.next().await {
            let doc = entry?;
            visited += 1;
            if visited > self.limits.scan_budget {
                tracing::warn!(
                    "Scan budget reached ({} docs). Stopping early.",
                    self.limits.scan_budget
                );
                break;
            }

            if doc.text.is_empty() {
                continue;
            }

            let score = score_document(&doc.text, keywords);
            if score == 0 {
                continue;
            }

            candidates.push(shape_hit(&doc, score, self.limits.snippet_chars));
        }

        Ok((candidates, visited))
    }
}
