//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the search and explanation endpoints together
//! with liveness, health, and statistics routes.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with query text and explain options
//! - **Output**: JSON responses with keywords, ranked results, explanations
//! - **Endpoints**: `/search-law`, `/explain-law`, `/`, `/ping`, `/health`,
//!   `/stats`
//!
//! ## Key Features
//! - Degenerate queries (no keywords, no matches) answer HTTP 200 with empty
//!   payloads; only genuine faults produce error statuses
//! - Store faults map to 503 (unavailable) or 500 (never initialized)
//! - Permissive CORS for browser frontends

use crate::errors::{Result, SearchError};
use crate::search::{SearchEngine, SearchHit, SearchOutcome};
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};

/// API server over the shared application state
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Search request payload
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Explain request payload. `max_results` may lower the number of results
/// fed to the explainer below the global result budget, never raise it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    5
}

/// Explain response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub query: String,
    pub keywords: Vec<String>,
    pub used_results: Vec<SearchHit>,
    pub explanation: String,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server until the process is stopped
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let workers = self.app_state.config.server.workers;
        let enable_cors = self.app_state.config.server.enable_cors;

        tracing::info!("Starting API server on {}", bind_addr);

        HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };
            App::new()
                .app_data(web::Data::new(self.app_state.clone()))
                .wrap(cors)
                .route("/", web::get().to(index_handler))
                .route("/ping", web::get().to(ping_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
                .route("/search-law", web::post().to(search_handler))
                .route("/explain-law", web::post().to(explain_handler))
        })
        .workers(workers)
        .bind(&bind_addr)
        .map_err(|e| SearchError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run()
        .await
        .map_err(|e| SearchError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Build the error body surfaced to API callers
fn error_response(err: &SearchError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(serde_json::json!({
        "error": err.category(),
        "message": err.to_string(),
    }))
}

/// Look up the search engine, failing fast when the store never came up
fn require_engine(state: &crate::AppState) -> Result<&SearchEngine> {
    match &state.engine {
        Some(engine) => Ok(engine),
        None => {
            tracing::error!("Document store is not initialized");
            Err(SearchError::StoreUninitialized)
        }
    }
}

/// Search endpoint handler
async fn search_handler(
    state: web::Data<crate::AppState>,
    request: web::Json<SearchRequest>,
) -> ActixResult<HttpResponse> {
    let engine = match require_engine(&state) {
        Ok(engine) => engine,
        Err(e) => return Ok(error_response(&e)),
    };

    match engine.search(&request.query).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(e) => {
            tracing::error!("Search error ({}): {}", e.category(), e);
            Ok(error_response(&e))
        }
    }
}

/// Explain endpoint handler: search, cap the results the caller asked for,
/// then hand them to the explainer in rank order.
async fn explain_handler(
    state: web::Data<crate::AppState>,
    request: web::Json<ExplainRequest>,
) -> ActixResult<HttpResponse> {
    let engine = match require_engine(&state) {
        Ok(engine) => engine,
        Err(e) => return Ok(error_response(&e)),
    };

    let outcome: SearchOutcome = match engine.search(&request.query).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Search error ({}): {}", e.category(), e);
            return Ok(error_response(&e));
        }
    };

    let limit = request
        .max_results
        .min(state.config.search.result_budget);
    let mut used_results = outcome.results;
    used_results.truncate(limit);

    match state.explainer.explain(&outcome.query, &used_results).await {
        Ok(explanation) => Ok(HttpResponse::Ok().json(ExplainResponse {
            query: outcome.query,
            keywords: outcome.keywords,
            used_results,
            explanation,
        })),
        Err(e) => {
            tracing::error!("Explanation error ({}): {}", e.category(), e);
            Ok(error_response(&e))
        }
    }
}

/// Health check endpoint handler
async fn health_handler(state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let store = match &state.store {
        Some(store) => store,
        None => return Ok(error_response(&SearchError::StoreUninitialized)),
    };

    match store.health_check().await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Ok(error_response(&e))
        }
    }
}

/// Statistics endpoint handler
async fn stats_handler(state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let store = match &state.store {
        Some(store) => store,
        None => return Ok(error_response(&SearchError::StoreUninitialized)),
    };

    match store.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(stats)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Liveness endpoint handler
async fn ping_handler() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "LAW-GPT backend running"})))
}

/// Service descriptor handler
async fn index_handler() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "LAW-GPT Backend",
        "description": "Search Indian bare acts by keyword, with plain-language explanations.",
        "health": "/ping",
    })))
}
