//! # Explanation Generation Module
//!
//! ## Purpose
//! Turns a query and its ranked law-text matches into a plain-language
//! explanation, either in formal English or in a conversational Hindi-English
//! mix depending on how the question was phrased.
//!
//! ## Input/Output Specification
//! - **Input**: Query text, its keyword set, and up to `result_budget` ranked
//!   results in final rank order
//! - **Output**: Free-text explanation, never legal advice
//! - **Register**: Chosen by a rough marker heuristic over the raw query,
//!   independent of ranking
//!
//! ## Key Features
//! - Gemini `generateContent` REST client when an API key is configured
//! - Deterministic template composition when no key is available
//! - Fixed guidance text when nothing matched (a successful outcome, not an
//!   error)
//!
//! The retrieval core guarantees every result carries a non-empty snippet;
//! this module only formats and forwards, it never re-ranks.

use crate::config::ExplainConfig;
use crate::errors::{Result, SearchError};
use crate::search::SearchHit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Answer register for generated explanations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    English,
    Hinglish,
}

/// Query-language markers that suggest a Hinglish answer. Matched as plain
/// substrings, which is deliberately rough: two independent hits are required
/// before the register flips.
const HINDI_MARKERS: &[&str] = &[
    "kya", "kaise", "hai", "nahi", "nhai", "kyun", "kyunki", "matlab", "samjha", "samjhao",
    "batao", "agar", "toh", "aisa", "waise", "yaar",
];

/// Characters of snippet quoted per bullet in composed explanations
const BULLET_SNIPPET_CHARS: usize = 220;

/// Results summarized in a composed explanation
const BULLET_LIMIT: usize = 8;

/// Pick the answer register from the raw query text
pub fn detect_register(text: &str) -> Register {
    let lowered = text.to_lowercase();
    let hits = HINDI_MARKERS
        .iter()
        .filter(|marker| lowered.contains(*marker))
        .count();
    if hits >= 2 {
        Register::Hinglish
    } else {
        Register::English
    }
}

/// Explanation generator
pub struct Explainer {
    config: ExplainConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl Explainer {
    /// Create a new explainer
    pub fn new(config: ExplainConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .expect("HTTP client construction cannot fail with static options");

        Self { config, client }
    }

    /// Generate an explanation for the given search outcome.
    ///
    /// Zero results is a recognized outcome, answered with fixed guidance.
    /// With an API key configured the model is asked; otherwise a
    /// deterministic template is composed from the snippets.
    pub async fn explain(&self, query: &str, results: &[SearchHit]) -> Result<String> {
        if results.is_empty() {
            tracing::info!("No search results for query='{}', returning guidance", query);
            return Ok(no_match_guidance().to_string());
        }

        let register = detect_register(query);

        match self.config.api_key {
            Some(_) => self.generate_with_model(query, results, register).await,
            None => Ok(compose_explanation(query, results, register)),
        }
    }

    /// Ask the model for an explanation grounded in the matched snippets
    async fn generate_with_model(
        &self,
        query: &str,
        results: &[SearchHit],
        register: Register,
    ) -> Result<String> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(query, results, register),
                }],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::ExplanationFailed {
                details: format!("model endpoint returned {}", response.status()),
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text: String = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            tracing::warn!("Model returned empty explanation for query='{}'", query);
            return Err(SearchError::ExplanationEmpty);
        }

        Ok(text)
    }
}

/// Guidance returned when the scan found nothing
fn no_match_guidance() -> &'static str {
    "No clear match was found in the indexed bare acts/pages for this query.\n\n\
     Try the following:\n\
     - Type the exact name of the Act (for example: 'Digital Personal Data Protection Act 2023').\n\
     - If you know it, also mention the section/article number (for example: 'Section 43 IT Act')."
}

/// Prompt sent to the model. The sources block carries every snippet with its
/// provenance so the model can cite pages.
fn build_prompt(query: &str, results: &[SearchHit], register: Register) -> String {
    let mut context_parts = Vec::new();
    for hit in results {
        let label = format!(
            "{} - {} (Page {})",
            hit.act_name.as_deref().unwrap_or(""),
            hit.title.as_deref().unwrap_or(""),
            hit.page_no.map_or_else(|| "?".to_string(), |p| p.to_string()),
        );
        context_parts.push(format!(
            "=== Source ===\nTitle: {}\nSnippet:\n{}\n",
            label.trim(),
            hit.snippet
        ));
    }
    let context_text = context_parts.join("\n\n");

    let (style_line, disclaimer) = match register {
        Register::Hinglish => (
            "explain in very simple friendly Hinglish (mix of Hindi and English), addressing the user as \"aap\" in a polite conversational tone",
            "Ye information educational purpose ke liye hai, legal advice nahi.",
        ),
        Register::English => (
            "explain in plain formal English, avoiding heavy legal jargon",
            "This information is for educational purposes only and is not legal advice.",
        ),
    };

    format!(
        "You are a helpful Indian legal explainer bot for laypersons.\n\n\
         User query:\n[START_USER_QUERY]\n{query}\n[END_USER_QUERY]\n\n\
         Relevant law snippets (may contain multiple pages and acts):\n{context_text}\n\n\
         Task:\n\
         1. In 3-5 lines, {style_line}: what is the law saying with respect to the query?\n\
         2. Then give bullet points summarizing the most important points and which page/section they roughly relate to (if visible from the snippet).\n\
         3. Be very clear that this is NOT legal advice.\n\n\
         Important:\n\
         - Use short sentences.\n\
         - If information is not clearly present, say that details are not fully clear and the user should check the bare act or consult a lawyer.\n\
         - End with this exact disclaimer sentence:\n\"{disclaimer}\"\n"
    )
}

/// Deterministic explanation composed directly from the matched snippets,
/// used when no model API key is configured.
fn compose_explanation(query: &str, results: &[SearchHit], register: Register) -> String {
    let mut acts: Vec<&str> = results
        .iter()
        .filter_map(|hit| hit.act_name.as_deref())
        .map(str::trim)
        .filter(|act| !act.is_empty())
        .collect();
    acts.sort_unstable();
    acts.dedup();
    acts.truncate(3);
    let acts_text = acts.join(", ");

    let mut intro = match register {
        Register::Hinglish => format!(
            "Tumne poocha: \"{query}\"\n\n\
             Jo bare acts aur judgments mile hain, unko dekh kar simplified explanation ye hai:\n"
        ),
        Register::English => format!(
            "You asked: \"{query}\"\n\n\
             Based on the bare acts and case law pages found in your documents, here is a simplified explanation:\n"
        ),
    };
    if !acts_text.is_empty() {
        intro.push_str(&match register {
            Register::Hinglish => {
                format!("Ye mainly in Acts/judgments se related hai: {acts_text}.\n\n")
            }
            Register::English => {
                format!("This mainly relates to these Acts/judgments: {acts_text}.\n\n")
            }
        });
    }

    let mut bullets = Vec::new();
    for hit in results.iter().take(BULLET_LIMIT) {
        let mut title = hit.act_name.as_deref().unwrap_or("").trim().to_string();
        if let Some(page_title) = hit.title.as_deref() {
            title = if title.is_empty() {
                page_title.to_string()
            } else {
                format!("{} – {}", title, page_title)
            };
        }
        let page = hit
            .page_no
            .map(|p| format!("(Page {})", p))
            .unwrap_or_default();
        let snippet: String = hit
            .snippet
            .trim()
            .replace('\n', " ")
            .chars()
            .take(BULLET_SNIPPET_CHARS)
            .collect();

        bullets.push(match register {
            Register::Hinglish => format!(
                "- {} {}: simple words me roughly ye bataya gaya hai ki \"{}\"",
                title, page, snippet
            ),
            Register::English => format!(
                "- {} {}: in simple terms, this passage is talking about \"{}\"",
                title, page, snippet
            ),
        });
    }

    intro + &bullets.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplainConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hit(act: &str, page_no: u32, snippet: &str) -> SearchHit {
        SearchHit {
            act_name: Some(act.to_string()),
            title: Some(format!("{} - Page {}", act, page_no)),
            page_no: Some(page_no),
            snippet: snippet.to_string(),
            score: 2,
        }
    }

    #[test]
    fn register_defaults_to_english() {
        assert_eq!(detect_register("what is the penalty for data breach"), Register::English);
    }

    #[test]
    fn two_marker_hits_flip_to_hinglish() {
        assert_eq!(detect_register("contract break kaise hota hai"), Register::Hinglish);
        // One marker alone is not enough.
        assert_eq!(detect_register("kya is a marker"), Register::English);
    }

    #[tokio::test]
    async fn zero_results_return_guidance_not_an_error() {
        let explainer = Explainer::new(ExplainConfig::default());
        let text = explainer.explain("unmatched query", &[]).await.unwrap();
        assert!(text.contains("exact name of the Act"));
    }

    #[tokio::test]
    async fn composed_explanation_cites_acts_and_pages() {
        let explainer = Explainer::new(ExplainConfig::default());
        let hits = vec![hit("IT Act", 5, "penalty for breach of contract")];

        let text = explainer
            .explain("what is the penalty for breach", &hits)
            .await
            .unwrap();
        assert!(text.contains("You asked"));
        assert!(text.contains("IT Act"));
        assert!(text.contains("(Page 5)"));
        assert!(text.contains("penalty for breach of contract"));
    }

    #[tokio::test]
    async fn hinglish_queries_get_hinglish_template() {
        let explainer = Explainer::new(ExplainConfig::default());
        let hits = vec![hit("IPC", 2, "punishment for theft")];

        let text = explainer
            .explain("chori ki punishment kya hai batao", &hits)
            .await
            .unwrap();
        assert!(text.contains("Tumne poocha"));
    }

    #[tokio::test]
    async fn model_response_text_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "  The law says a penalty applies.  "}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let config = ExplainConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            ..ExplainConfig::default()
        };
        let explainer = Explainer::new(config);
        let hits = vec![hit("IT Act", 5, "penalty for breach")];

        let text = explainer.explain("penalty for breach", &hits).await.unwrap();
        assert_eq!(text, "The law says a penalty applies.");
    }

    #[tokio::test]
    async fn upstream_failure_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = ExplainConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            ..ExplainConfig::default()
        };
        let explainer = Explainer::new(config);
        let hits = vec![hit("IT Act", 5, "penalty for breach")];

        let err = explainer.explain("penalty", &hits).await.unwrap_err();
        assert!(matches!(err, SearchError::ExplanationFailed { .. }));
    }

    #[tokio::test]
    async fn empty_model_text_is_an_upstream_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let config = ExplainConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            ..ExplainConfig::default()
        };
        let explainer = Explainer::new(config);
        let hits = vec![hit("IT Act", 5, "penalty for breach")];

        let err = explainer.explain("penalty", &hits).await.unwrap_err();
        assert!(matches!(err, SearchError::ExplanationEmpty));
    }
}
