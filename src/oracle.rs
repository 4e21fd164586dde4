//! Title oracle: proposes chapter titles for a book excerpt.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;

const SYSTEM_PROMPT: &str = r#"Output strict JSON array of {"title":"..."} objects only."#;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$").expect("valid fence regex")
});

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle response malformed: {0}")]
    Malformed(String),
}

pub trait TitleOracle {
    /// Chapter titles, in reading order, for the leading excerpt of a book.
    fn propose_titles(&self, preview: &str) -> Result<Vec<String>, OracleError>;
}

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Chat-completions client for an OpenAI compatible endpoint.
pub struct OpenAiTitleOracle {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiTitleOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: chat_completions_endpoint(&config.base_url),
            api_key: config.api_key,
            model: config.model,
        })
    }
}

impl TitleOracle for OpenAiTitleOracle {
    fn propose_titles(&self, preview: &str) -> Result<Vec<String>, OracleError> {
        info!(model = %self.model, preview_chars = preview.chars().count(), "requesting chapter titles");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.model, preview))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: truncate(&body, 400),
            });
        }

        let content = completion_content(&body)?;
        parse_title_payload(&content)
    }
}

fn chat_completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn request_body(model: &str, preview: &str) -> Value {
    json!({
        "model": model,
        "temperature": 0,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": user_prompt(preview) },
        ],
    })
}

fn user_prompt(preview: &str) -> String {
    format!(
        "You're given the first pages of an ebook. \
Return ONLY a JSON array of objects with a single field title, listing each chapter heading in order.\n\n\
Ebook excerpt:\n\"\"\"\n{preview}\n\"\"\""
    )
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

fn completion_content(body: &str) -> Result<String, OracleError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|err| OracleError::Malformed(format!("completion envelope: {err}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| OracleError::Malformed("completion has no message content".to_string()))
}

/// Titles from the assistant message: a JSON array of `{"title": ...}`
/// objects or bare strings, optionally inside a markdown code fence.
pub fn parse_title_payload(content: &str) -> Result<Vec<String>, OracleError> {
    let payload = CODE_FENCE
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map_or(content, |inner| inner.as_str());

    let value: Value = serde_json::from_str(payload.trim())
        .map_err(|err| OracleError::Malformed(format!("titles are not JSON: {err}")))?;
    let Value::Array(entries) = value else {
        return Err(OracleError::Malformed("titles payload is not an array".to_string()));
    };

    let mut titles = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let title = match entry {
            Value::String(title) => title,
            Value::Object(mut object) => match object.remove("title") {
                Some(Value::String(title)) => title,
                _ => {
                    return Err(OracleError::Malformed(format!(
                        "entry {index} has no string title"
                    )));
                }
            },
            other => {
                return Err(OracleError::Malformed(format!(
                    "entry {index} is not a title: {other}"
                )));
            }
        };
        let title = title.trim();
        if !title.is_empty() {
            titles.push(title.to_string());
        }
    }
    Ok(titles)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
