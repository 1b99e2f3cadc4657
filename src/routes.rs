use axum::{Json, Router, extract::{rejection::JsonRejection, Path, State}, response::{IntoResponse, Response}, routing::{get, post}};
use std::{collections::HashMap, sync::Arc};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{CorsLayer, Any};

use crate::{
    agent::CampaignPlanner,
    config::BackendMode,
    error::ApiError,
    gemini::{build_caption_prompt, TextGenerator},
    models::{CampaignRecord, GenerationRequest, GenerationResult, TextResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub mode: BackendMode,
    pub user_id: String,
    pub text: Arc<dyn TextGenerator>,
    pub planner: Arc<dyn CampaignPlanner>,
    pub history: Arc<RwLock<HashMap<String, Vec<CampaignRecord>>>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/generate", post(generate))
        .route("/api/campaigns/:user_id", get(campaign_history))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

const INVALID_BODY: &str = "Request body must be a JSON object with string fields businessType and topic";

/// Lenient body so missing fields become a 400 with our own message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default, alias = "business")]
    business_type: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

impl GenerateBody {
    fn validate(self) -> Result<GenerationRequest, ApiError> {
        let business_type = self.business_type.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let topic = self.topic.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        match (business_type, topic) {
            (Some(b), Some(t)) => Ok(GenerationRequest::new(b, t)),
            _ => Err(ApiError::BadRequest("Missing required fields: topic and businessType".into())),
        }
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Prachar.ai Creative Director",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "agent": "operational",
        "endpoints": ["/api/generate", "/api/campaigns/:user_id"],
    }))
}

pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::warn!("⚠️ Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest(INVALID_BODY.into())
    })?;
    let request = body.validate()?;
    tracing::info!("🚀 Generating campaign for {} / {}", request.business_type, request.topic);

    match state.mode {
        BackendMode::Text => {
            let prompt = build_caption_prompt(&request.topic, &request.business_type);
            let result = state.text.generate_text(&prompt).await.map_err(|e| {
                tracing::error!("❌ Text generation failed: {}", e);
                ApiError::Upstream("Failed to generate marketing copy".into())
            })?;
            tracing::info!("✅ Generated {} chars of copy", result.len());
            Ok(Json(TextResponse { result }).into_response())
        }
        BackendMode::Agent => {
            let goal = request.goal();
            let planned = state.planner.plan_campaign(&goal, &state.user_id).await.map_err(|e| {
                tracing::error!("❌ Campaign planning failed: {}", e);
                ApiError::Upstream("Failed to plan campaign".into())
            })?;
            let record = CampaignRecord::completed(&state.user_id, goal, GenerationResult::from(planned));
            state.history.write().entry(record.user_id.clone()).or_default().push(record.clone());
            tracing::info!("✅ Campaign {} completed with {} captions", record.campaign_id, record.result.captions.len());
            Ok(Json(record).into_response())
        }
    }
}

pub async fn campaign_history(Path(user_id): Path<String>, State(state): State<AppState>) -> Json<Value> {
    let campaigns = state.history.read().get(&user_id).cloned().unwrap_or_default();
    Json(json!({ "userId": user_id, "campaigns": campaigns }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agent::{AgentError, CatalogPlanner}, gemini::GeminiError, models::PlannedCampaign};
    use async_trait::async_trait;
    use axum::{body::{to_bytes, Body}, http::{Request, StatusCode}};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
            Ok(format!("1. {}", prompt.lines().nth(1).unwrap_or_default()))
        }
    }

    struct Down;

    #[async_trait]
    impl TextGenerator for Down {
        async fn generate_text(&self, _: &str) -> Result<String, GeminiError> {
            Err(GeminiError::Http("secret provider detail".into()))
        }
    }

    #[async_trait]
    impl CampaignPlanner for Down {
        async fn plan_campaign(&self, _: &str, _: &str) -> Result<PlannedCampaign, AgentError> {
            Err(AgentError::Http("secret agent detail".into()))
        }
    }

    fn state(mode: BackendMode, text: Arc<dyn TextGenerator>, planner: Arc<dyn CampaignPlanner>) -> AppState {
        AppState { mode, user_id: "demo_user".into(), text, planner, history: Arc::default() }
    }

    async fn call(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn text_mode_returns_result_string() {
        let app = router(state(BackendMode::Text, Arc::new(Echo), Arc::new(CatalogPlanner)));
        let (status, body) = call(app, "POST", "/api/generate", json!({"businessType": "Cafe", "topic": "Diwali"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"result": "1. User runs a Cafe business."}));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_with_400() {
        let app = router(state(BackendMode::Text, Arc::new(Echo), Arc::new(CatalogPlanner)));
        let (status, body) = call(app, "POST", "/api/generate", json!({"topic": "Diwali", "businessType": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: topic and businessType");
    }

    async fn call_raw(app: Router, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
        let mut req = Request::builder().method("POST").uri("/api/generate");
        if let Some(ct) = content_type {
            req = req.header("content-type", ct);
        }
        let res = app.oneshot(req.body(Body::from(body)).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn malformed_bodies_are_400_with_error_json() {
        let app = router(state(BackendMode::Text, Arc::new(Echo), Arc::new(CatalogPlanner)));
        let cases = [
            (Some("application/json"), r#"{"businessType":1,"topic":"x"}"#),
            (None, r#"{"businessType":"Cafe","topic":"Diwali"}"#),
            (Some("text/plain"), r#"{"businessType":"Cafe","topic":"Diwali"}"#),
            (Some("application/json"), "not json"),
        ];
        for (content_type, body) in cases {
            let (status, error_body) = call_raw(app.clone(), content_type, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body} with {content_type:?}");
            assert_eq!(error_body, json!({"error": INVALID_BODY}));
        }
    }

    #[tokio::test]
    async fn provider_errors_are_wrapped() {
        let app = router(state(BackendMode::Text, Arc::new(Down), Arc::new(Down)));
        let (status, body) = call(app.clone(), "POST", "/api/generate", json!({"businessType": "Cafe", "topic": "Diwali"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to generate marketing copy"}));

        let app = router(state(BackendMode::Agent, Arc::new(Down), Arc::new(Down)));
        let (status, body) = call(app, "POST", "/api/generate", json!({"business": "Cafe", "topic": "Diwali"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to plan campaign"}));
    }

    #[tokio::test]
    async fn agent_mode_returns_campaign_and_records_history() {
        let app = router(state(BackendMode::Agent, Arc::new(Echo), Arc::new(CatalogPlanner)));
        let (status, body) = call(app.clone(), "POST", "/api/generate", json!({"business": "Tech Club", "topic": "Hackathon"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["goal"], "Create a campaign for a Tech Club focusing on Hackathon");
        assert_eq!(body["cta"], "Assemble your dream team. Registration ends in 48 hours!");
        assert_eq!(body["captions"].as_array().map(Vec::len), Some(3));
        assert!(body["imageUrl"].as_str().is_some_and(|u| u.starts_with("https://")));

        let (status, history) = call(app.clone(), "GET", "/api/campaigns/demo_user", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history["campaigns"][0]["campaignId"], body["campaignId"]);

        let (_, empty) = call(app, "GET", "/api/campaigns/nobody", Value::Null).await;
        assert_eq!(empty, json!({"userId": "nobody", "campaigns": []}));
    }

    #[tokio::test]
    async fn health_endpoints_report_healthy() {
        let app = router(state(BackendMode::Agent, Arc::new(Echo), Arc::new(CatalogPlanner)));
        let (_, root) = call(app.clone(), "GET", "/", Value::Null).await;
        assert_eq!(root["status"], "healthy");
        let (_, health) = call(app, "GET", "/health", Value::Null).await;
        assert_eq!(health["agent"], "operational");
    }
}
