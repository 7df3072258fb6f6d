//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the search backend, supporting
//! a TOML configuration file with environment variable overrides, validation,
//! and type-safe access to all system settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! The search limits (`scan_budget`, `result_budget`, `snippet_chars`) are
//! fixed operational constants for a deployment, not per-request overrides.
//! The only per-request knob is `max_results` on the explain endpoint, which
//! may lower (never raise) the global result budget.
//!
//! ## Usage
//! ```rust,no_run
//! use lawgpt_backend::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Document store settings
    pub store: StoreConfig,
    /// Search engine limits
    pub search: SearchConfig,
    /// Ingestion settings
    pub ingestion: IngestionConfig,
    /// Explanation generation settings
    pub explain: ExplainConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of HTTP worker threads
    pub workers: usize,
    /// Enable permissive CORS for browser frontends
    pub enable_cors: bool,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file path
    pub db_path: PathBuf,
    /// Named collection the act pages live in
    pub collection: String,
    /// Compress stored record bodies
    pub enable_compression: bool,
}

/// Search engine limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hard cap on documents visited per search call, independent of corpus
    /// size. Protects against unbounded store scans, not a result-count cap.
    pub scan_budget: usize,
    /// Hard cap on ranked results returned per search call
    pub result_budget: usize,
    /// Characters per result snippet (prefix of the page text, verbatim)
    pub snippet_chars: usize,
    /// Maximum keywords extracted from a query
    pub query_keyword_limit: usize,
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Maximum keywords precomputed per ingested page
    pub document_keyword_limit: usize,
}

/// Explanation generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    /// Model API key. When absent, explanations fall back to a deterministic
    /// template composed from the matched snippets.
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Base URL of the generateContent endpoint (overridable for tests)
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| SearchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("LAWGPT_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("LAWGPT_PORT") {
            self.server.port = port.parse().map_err(|_| SearchError::Config {
                message: "Invalid port number in LAWGPT_PORT".to_string(),
            })?;
        }
        if let Ok(db_path) = std::env::var("LAWGPT_DB_PATH") {
            self.store.db_path = PathBuf::from(db_path);
        }
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            self.explain.api_key = Some(api_key);
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SearchError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.search.scan_budget == 0 {
            return Err(SearchError::ValidationFailed {
                field: "search.scan_budget".to_string(),
                reason: "Scan budget must be greater than zero".to_string(),
            });
        }

        if self.search.result_budget == 0 {
            return Err(SearchError::ValidationFailed {
                field: "search.result_budget".to_string(),
                reason: "Result budget must be greater than zero".to_string(),
            });
        }

        if self.search.snippet_chars == 0 {
            return Err(SearchError::ValidationFailed {
                field: "search.snippet_chars".to_string(),
                reason: "Snippet length must be greater than zero".to_string(),
            });
        }

        if self.search.query_keyword_limit == 0 || self.ingestion.document_keyword_limit == 0 {
            return Err(SearchError::ValidationFailed {
                field: "keyword_limit".to_string(),
                reason: "Keyword limits must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            search: SearchConfig::default(),
            ingestion: IngestionConfig::default(),
            explain: ExplainConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: num_cpus::get(),
            enable_cors: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/acts.db"),
            collection: "acts".to_string(),
            enable_compression: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scan_budget: 2000,
            result_budget: 20,
            snippet_chars: 400,
            query_keyword_limit: 5,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            document_keyword_limit: 10,
        }
    }
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
