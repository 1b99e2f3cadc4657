use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use serde::Deserialize;
use reqwest::Client;
use tracing::{info, error};

use crate::config::{ServerConfig, DEMO_KEY};

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")] Http(String),
    #[error("Other: {0}")] Other(String),
}

/// Opaque text-generation capability: prompt in, free text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(cfg: &ServerConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: cfg.gemini_api_key.clone(),
            base_url: cfg.gemini_api_base.trim_end_matches('/').to_string(),
            model: cfg.gemini_text_model.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
        if self.api_key == DEMO_KEY {
            info!("Using demo mode - returning canned captions");
            return Ok(demo_captions());
        }

        let payload = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 600
            }
        });

        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, self.api_key);
        info!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));

        let response = self.client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GeminiError::Http(e.to_string()))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| GeminiError::Http(e.to_string()))?;

        if !status.is_success() {
            error!("❌ Gemini text generation failed with status {}: {}", status, response_text);
            return Err(GeminiError::Http(format!("HTTP {}: {}", status, response_text)));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| GeminiError::Other(format!("Failed to parse response: {}", e)))?;

        first_text(&parsed).ok_or_else(|| GeminiError::Other("No text content found in response".to_string()))
    }
}

/// Prompt for three short social captions for a business and topic.
pub fn build_caption_prompt(topic: &str, business_type: &str) -> String {
    format!(
        "You are Prachar.ai, an expert Indian marketing agent.\n\
         User runs a {business_type} business.\n\
         Topic: {topic}\n\
         Task: Write 3 catchy social media captions in 'Hinglish' (Hindi + English mix). \
         Number them 1., 2. and 3. Keep it energetic and use emojis suitable for an Indian audience."
    )
}

/// Split numbered (`1.`, `1)`) or bulleted (`-`) lines into exactly three captions.
pub fn parse_captions(text: &str) -> Vec<String> {
    let mut captions: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()) || l.starts_with('-'))
        .map(|l| l.trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | ' ')).trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if captions.is_empty() {
        let whole = text.trim();
        if whole.is_empty() {
            return Vec::new();
        }
        captions.push(whole.to_string());
    }
    while captions.len() < 3 {
        captions.push(captions[0].clone());
    }
    captions.truncate(3);
    captions
}

fn demo_captions() -> String {
    [
        "1. 🚀 Demo mode on! Apna campaign ready hai - register karo abhi! #Prachar",
        "2. ✨ Energy high, vibes higher - don't miss out! #DemoCampaign",
        "3. 🔥 Limited spots, unlimited hype - jaldi karo! #JoinNow",
    ]
    .join("\n")
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

/// Image and other non-text parts simply have no `text`.
#[derive(Debug, Deserialize)]
struct Part { #[serde(default)] text: Option<String> }

fn first_text(resp: &GeminiResponse) -> Option<String> {
    resp.candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
        .find_map(|p| p.text.as_deref().map(|t| t.trim().to_string()))
}
