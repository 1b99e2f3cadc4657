use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn, error};

use crate::{catalog, models::PlannedCampaign};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")] Http(String),
    #[error("Bad agent payload: {0}")] Payload(String),
}

/// Opaque planning capability: goal + user in, structured campaign out.
#[async_trait]
pub trait CampaignPlanner: Send + Sync {
    async fn plan_campaign(&self, goal: &str, user_id: &str) -> Result<PlannedCampaign, AgentError>;
}

/// Locally running agent process reached over HTTP.
pub struct AgentClient {
    client: Client,
    url: String,
}

impl AgentClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: Client::new(), url: url.into() }
    }
}

#[async_trait]
impl CampaignPlanner for AgentClient {
    async fn plan_campaign(&self, goal: &str, user_id: &str) -> Result<PlannedCampaign, AgentError> {
        info!("🤖 Asking agent at {} to plan: {}", self.url, goal);
        let response = self.client
            .post(&self.url)
            .json(&json!({ "goal": goal, "user_id": user_id }))
            .send()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Agent error response: {}", body);
            return Err(AgentError::Http(format!("status={} body={}", status, body)));
        }

        let planned: PlannedCampaign = response
            .json()
            .await
            .map_err(|e| AgentError::Payload(e.to_string()))?;
        info!("✅ Agent planned campaign with {} captions", planned.captions.len());
        Ok(planned)
    }
}

/// Planner backed by the offline catalog; never fails.
pub struct CatalogPlanner;

#[async_trait]
impl CampaignPlanner for CatalogPlanner {
    async fn plan_campaign(&self, goal: &str, _user_id: &str) -> Result<PlannedCampaign, AgentError> {
        info!("⚡ Serving catalog campaign for: {}", goal);
        Ok(catalog::find_best_match(goal))
    }
}

/// Wraps a planner so any failure is answered from the catalog instead.
pub struct CatalogFailover {
    inner: Arc<dyn CampaignPlanner>,
}

impl CatalogFailover {
    pub fn new(inner: Arc<dyn CampaignPlanner>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CampaignPlanner for CatalogFailover {
    async fn plan_campaign(&self, goal: &str, user_id: &str) -> Result<PlannedCampaign, AgentError> {
        match self.inner.plan_campaign(goal, user_id).await {
            Ok(planned) => Ok(planned),
            Err(e) => {
                warn!("📡 Agent failed ({}); failing over to catalog", e);
                CatalogPlanner.plan_campaign(goal, user_id).await
            }
        }
    }
}
