//! # LAW-GPT Search Backend
//!
//! ## Overview
//! This library implements a keyword search backend over ingested pages of
//! Indian bare acts, with an optional model-generated plain-language
//! explanation of the matched law text.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `keywords`: Keyword extraction from queries and document text
//! - `search`: Corpus scanning, scoring, ranking, and snippet shaping
//! - `store`: Persistent document store backed by an embedded database
//! - `ingest`: Ingestion of per-page act text into the store
//! - `explain`: Plain-language explanation generation (English or Hinglish)
//! - `api`: REST API endpoints
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Per-page act text (ingestion), search queries (text)
//! - **Output**: Ranked search results with provenance and snippets, plus an
//!   optional generated explanation
//! - **Performance**: One bounded sequential scan per query, deterministic
//!   ranking
//!
//! ## Usage
//! ```rust,no_run
//! use lawgpt_backend::{Config, SearchEngine, SledDocumentStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let store = Arc::new(SledDocumentStore::new(&config.store)?);
//!     let engine = SearchEngine::new(config.search.clone(), store);
//!     let outcome = engine.search("penalty for breach of contract").await?;
//!     println!("Found {} results", outcome.results.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod errors;
pub mod explain;
pub mod ingest;
pub mod keywords;
pub mod search;
pub mod store;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, SearchError};
pub use explain::Explainer;
pub use keywords::KeywordExtractor;
pub use search::{SearchEngine, SearchHit, SearchOutcome};
pub use store::{DocumentStore, SledDocumentStore, StoredDocument};

use std::sync::Arc;

/// Application state shared across API handlers.
///
/// `engine` is `None` when the document store could not be opened at startup;
/// the server keeps running and every search call fails fast with
/// `StoreUninitialized` until the store configuration is fixed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub engine: Option<Arc<search::SearchEngine>>,
    pub store: Option<Arc<dyn store::DocumentStore>>,
    pub explainer: Arc<explain::Explainer>,
}
