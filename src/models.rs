use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Inputs collected from the user for one generation cycle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(alias = "business")]
    pub business_type: String,
    pub topic: String,
}

impl GenerationRequest {
    pub fn new(business_type: impl Into<String>, topic: impl Into<String>) -> Self {
        Self { business_type: business_type.into(), topic: topic.into() }
    }

    /// Goal sentence handed to the planning agent.
    pub fn goal(&self) -> String {
        format!("Create a campaign for a {} focusing on {}", self.business_type, self.topic)
    }
}

/// Canonical campaign output rendered by the studio.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(default)]
    pub hook: String,
    #[serde(default)]
    pub offer: String,
    #[serde(default)]
    pub cta: String,
    #[serde(default)]
    pub captions: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

impl GenerationResult {
    /// Text block placed on the clipboard by the copy action.
    pub fn clipboard_text(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.hook, self.offer, self.cta)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CampaignPlan {
    #[serde(default)]
    pub hook: String,
    #[serde(default)]
    pub offer: String,
    #[serde(default)]
    pub cta: String,
}

/// What a planner (remote agent or the built-in catalog) hands back.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PlannedCampaign {
    #[serde(default)]
    pub plan: CampaignPlan,
    #[serde(default)]
    pub captions: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

impl From<PlannedCampaign> for GenerationResult {
    fn from(p: PlannedCampaign) -> Self {
        Self {
            hook: p.plan.hook,
            offer: p.plan.offer,
            cta: p.plan.cta,
            captions: p.captions,
            image_url: p.image_url,
        }
    }
}

/// Agent-mode response body; the flattened result is what the studio consumes.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    pub campaign_id: Uuid,
    pub user_id: String,
    pub goal: String,
    #[serde(flatten)]
    pub result: GenerationResult,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl CampaignRecord {
    pub fn completed(user_id: &str, goal: String, result: GenerationResult) -> Self {
        Self {
            campaign_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            goal,
            result,
            status: "completed".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Text-mode response body.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TextResponse {
    pub result: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Primary,
    Fallback,
}

impl EngineState {
    pub fn badge(self) -> &'static str {
        match self {
            EngineState::Primary => "ENGINE // FLUX",
            EngineState::Fallback => "ENGINE // TURBO",
        }
    }

    /// Status lines shown over the visual while a cycle is in flight.
    pub fn status_lines(self) -> [&'static str; 3] {
        match self {
            EngineState::Primary => [
                "Synthesizing 8K Assets",
                "ESTIMATED ARRIVAL: 15-20 SECONDS",
                "Waiting for Flux Engine response...",
            ],
            EngineState::Fallback => [
                "Optimizing Visual Stream",
                "SWITCHING TO TURBO FOR SPEED...",
                "Turbo Engine engaged for low-latency delivery.",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    InFlight,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultTab {
    #[default]
    Strategy,
    Visuals,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_accepts_agent_field_name() {
        let a: GenerationRequest = serde_json::from_str(r#"{"businessType":"Tech Club","topic":"Hackathon"}"#).unwrap();
        let b: GenerationRequest = serde_json::from_str(r#"{"business":"Tech Club","topic":"Hackathon"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.goal(), "Create a campaign for a Tech Club focusing on Hackathon");
    }

    #[test]
    fn campaign_record_flattens_result() {
        let result = GenerationResult {
            hook: "H".into(),
            offer: "O".into(),
            cta: "C".into(),
            captions: vec!["A".into()],
            image_url: "https://x/img".into(),
        };
        let record = CampaignRecord::completed("u1", "goal".into(), result);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["hook"], "H");
        assert_eq!(value["imageUrl"], "https://x/img");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["status"], "completed");
    }

    #[test]
    fn clipboard_text_joins_copy_blocks() {
        let result = GenerationResult { hook: "H".into(), offer: "O".into(), cta: "C".into(), ..Default::default() };
        assert_eq!(result.clipboard_text(), "H\n\nO\n\nC");
    }
}
