//! LLM augmentation for protocol generation
//!
//! This module handles the optional Claude API call that proposes a few
//! extra protocol items on top of the locally resolved catalog candidates.
//! The call is strictly best-effort: timeouts, transport failures and
//! malformed responses all collapse into `Augmentation::Unavailable`, which
//! the merger logs and ignores. No error from this module ever aborts
//! protocol generation.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";

/// Hard ceiling on how long protocol generation waits for augmentation
const AUGMENTATION_TIMEOUT: Duration = Duration::from_secs(10);

/// "Up to a few" extra items; anything beyond this is dropped
pub const MAX_AUGMENTED_ITEMS: usize = 3;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("Timed out after {0} seconds")]
  Timeout(u64),
}

/// ---------------------------------------------------------------------------
/// Claude API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest {
  model: String,
  max_tokens: u32,
  system: String,
  messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
  #[allow(dead_code)]
  model: String,
  #[allow(dead_code)]
  stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
  error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Augmentation Outcome
/// ---------------------------------------------------------------------------

/// One item proposed by the model. Everything beyond the type and name is
/// optional; the merger fills sensible defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedItem {
  #[serde(rename = "type")]
  pub item_type: String,
  pub name: String,
  pub frequency: Option<String>,
  pub time_of_day: Option<Vec<String>>,
  pub rationale: Option<String>,
}

/// Tagged result of the augmentation call. Parse failures become
/// `Unavailable`, never a panic or a propagated error.
#[derive(Debug)]
pub enum Augmentation {
  Available(Vec<SuggestedItem>),
  Unavailable(String),
}

/// ---------------------------------------------------------------------------
/// Augmentation Client
/// ---------------------------------------------------------------------------

pub struct AugmentationClient {
  client: Client,
  api_key: String,
  api_url: String,
}

impl AugmentationClient {
  /// Create a new client, loading the API key from the environment
  pub fn from_env() -> Result<Self, LlmError> {
    let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| LlmError::MissingApiKey)?;

    Ok(Self {
      client: Client::new(),
      api_key,
      api_url: CLAUDE_API_URL.to_string(),
    })
  }

  #[cfg(test)]
  pub fn with_api_url(api_key: &str, api_url: &str) -> Self {
    Self {
      client: Client::new(),
      api_key: api_key.to_string(),
      api_url: api_url.to_string(),
    }
  }

  /// Call Claude with a system prompt and user message
  async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<String, LlmError> {
    let request = ClaudeRequest {
      model: CLAUDE_MODEL.to_string(),
      max_tokens,
      system: system_prompt.to_string(),
      messages: vec![ClaudeMessage {
        role: "user".to_string(),
        content: user_message.to_string(),
      }],
    };

    let response = self
      .client
      .post(&self.api_url)
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      // Try to parse error response
      if let Ok(error_resp) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let claude_response: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    claude_response
      .content
      .iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text.clone())
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))
  }

  /// Ask the model for up to `MAX_AUGMENTED_ITEMS` additional protocol items
  /// given the user's focus areas and the already-resolved candidate names.
  ///
  /// Never returns an error: every failure mode is folded into
  /// `Augmentation::Unavailable` with a reason string for the log.
  pub async fn suggest_protocol_items(
    &self,
    focus_areas: &[String],
    current_items: &[String],
  ) -> Augmentation {
    let system_prompt = include_str!("prompts/protocol_system.txt");

    let user_message = format!(
      r#"FOCUS AREAS (topic, severity, score):
{}

ITEMS ALREADY IN THE PROTOCOL:
{}

Suggest up to {} additional intervention items that complement the existing
protocol without repeating it. Respond with a JSON array only; each element:
{{"type": "supplement|exercise|diet|habit|therapy", "name": "...",
"frequency": "...", "time_of_day": ["morning"|"afternoon"|"evening"|"bedtime"],
"rationale": "..."}}"#,
      focus_areas.join("\n"),
      current_items.join("\n"),
      MAX_AUGMENTED_ITEMS
    );

    let call = self.complete(system_prompt, &user_message, 1024);
    let response_text = match tokio::time::timeout(AUGMENTATION_TIMEOUT, call).await {
      Err(_) => {
        return Augmentation::Unavailable(
          LlmError::Timeout(AUGMENTATION_TIMEOUT.as_secs()).to_string(),
        )
      }
      Ok(Err(e)) => return Augmentation::Unavailable(e.to_string()),
      Ok(Ok(text)) => text,
    };

    match parse_suggested_items(&response_text) {
      Ok(mut items) => {
        items.truncate(MAX_AUGMENTED_ITEMS);
        Augmentation::Available(items)
      }
      Err(e) => Augmentation::Unavailable(e.to_string()),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Defensive Parsing
/// ---------------------------------------------------------------------------

fn parse_suggested_items(text: &str) -> Result<Vec<SuggestedItem>, LlmError> {
  let json_str = extract_json_array(text)?;
  serde_json::from_str(&json_str).map_err(|e| LlmError::Parse(format!("{}: {}", e, json_str)))
}

/// Extract a JSON array from the model's response (handles markdown code
/// blocks and surrounding prose)
fn extract_json_array(text: &str) -> Result<String, LlmError> {
  // Try direct parse first
  if text.trim().starts_with('[') {
    return Ok(text.trim().to_string());
  }

  // Look for JSON in code blocks
  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  // Look for plain code blocks
  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  // Last resort: first [ to last ]
  if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(LlmError::Parse(
    "Could not extract JSON array from response".to_string(),
  ))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
