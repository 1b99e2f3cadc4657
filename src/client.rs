//! Request Client: sends inputs to the backend and normalizes whatever comes back.
//!
//! Both backend shapes are accepted: the agent record (`hook`, `offer`, `cta`,
//! `captions`, `imageUrl`, optionally nested under `plan` / `image_url`) and the
//! text variant (`{ "result": "..." }`). Absent fields map to empty values.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    error::GenerationError,
    gemini::parse_captions,
    models::{GenerationRequest, GenerationResult},
};

const RESULT_KEYS: [&str; 8] = ["hook", "offer", "cta", "captions", "imageUrl", "image_url", "plan", "result"];

/// Backend seam used by the controller runtime.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn submit(&self, request: GenerationRequest) -> Result<GenerationResult, GenerationError>;

    /// Re-request a display asset; success means the asset is reachable.
    async fn fetch_asset(&self, url: &str) -> Result<(), GenerationError>;
}

pub struct HttpBackend {
    client: Client,
    endpoint: String,
    asset_timeout: Duration,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into(), asset_timeout: Duration::from_secs(45) }
    }

    /// Asset re-fetches give up after this long so a re-render cycle always ends.
    pub fn with_asset_timeout(mut self, timeout: Duration) -> Self {
        self.asset_timeout = timeout;
        self
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn submit(&self, request: GenerationRequest) -> Result<GenerationResult, GenerationError> {
        info!("📤 Submitting {} / {} to {}", request.business_type, request.topic, self.endpoint);
        let response = self.client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(GenerationError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            warn!("❌ Backend answered {}: {}", status, reason);
            return Err(GenerationError::BackendUnavailable { status: status.to_string(), reason });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        map_payload(payload)
    }

    async fn fetch_asset(&self, url: &str) -> Result<(), GenerationError> {
        debug!("🖼️ Re-fetching asset {}", url);
        let response = self.client
            .get(url)
            .timeout(self.asset_timeout)
            .send()
            .await
            .map_err(GenerationError::transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GenerationError::BackendUnavailable { status: status.to_string(), reason: "asset fetch failed".into() })
        }
    }
}

/// Normalizes a success payload into a [`GenerationResult`].
pub fn map_payload(payload: Value) -> Result<GenerationResult, GenerationError> {
    let Value::Object(obj) = payload else {
        return Err(GenerationError::InvalidResponse("payload is not a JSON object".into()));
    };

    if !RESULT_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Err(match obj.get("error").and_then(Value::as_str) {
            Some(msg) => GenerationError::GenerationFailed(msg.to_string()),
            None => GenerationError::InvalidResponse("payload carries no campaign fields".into()),
        });
    }

    let plan = obj.get("plan").and_then(Value::as_object);
    let field = |key: &str| {
        text(&obj, key)
            .or_else(|| plan.and_then(|p| text(p, key)))
            .unwrap_or_default()
    };

    let captions = match obj.get("captions").and_then(Value::as_array) {
        Some(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        None => text(&obj, "result").map(|r| parse_captions(&r)).unwrap_or_default(),
    };

    Ok(GenerationResult {
        hook: field("hook"),
        offer: field("offer"),
        cta: field("cta"),
        captions,
        image_url: text(&obj, "imageUrl").or_else(|| text(&obj, "image_url")).unwrap_or_default(),
    })
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}
