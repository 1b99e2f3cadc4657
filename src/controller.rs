//! Generation lifecycle controller.
//!
//! A reducer: [`Controller::handle`] takes one [`Event`], mutates the owned
//! [`ControllerState`] and returns the [`Effect`]s the runtime must perform.
//! Every asynchronous event carries the [`CycleId`] it was issued under and is
//! dropped unless that id is the current cycle.

use std::fmt;

use tracing::debug;

use crate::{
    config::RerenderPolicy,
    error::GenerationError,
    fallback::{cache_busted, to_fallback_url},
    models::{EngineState, GenerationRequest, GenerationResult, LifecycleState, ResultTab},
    narrator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CycleId(u64);

impl CycleId {
    fn next(self) -> Self {
        CycleId(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    EditBusiness(String),
    EditTopic(String),
    Submit,
    ForceRerender,
    SelectTab(ResultTab),
    CopyToClipboard,
    Response { cycle: CycleId, outcome: Result<GenerationResult, GenerationError> },
    FallbackElapsed { cycle: CycleId },
    NarratorLine { cycle: CycleId, line: String },
    AssetLoaded { cycle: CycleId, url: String, outcome: Result<(), GenerationError> },
    CopyExpired { token: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendRequest { cycle: CycleId, request: GenerationRequest },
    StartNarrator { cycle: CycleId, steps: Vec<String> },
    StartFallbackTimer { cycle: CycleId },
    /// Stop the watchdog and narrator belonging to `cycle`.
    CancelTimers { cycle: CycleId },
    FetchAsset { cycle: CycleId, url: String },
    WriteClipboard(String),
    ScheduleCopyReset { token: u64 },
    Notify(String),
}

/// What the in-flight cycle is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Awaiting {
    #[default]
    Nothing,
    Response,
    Asset,
}

#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub business_type: String,
    pub topic: String,
    pub lifecycle: LifecycleState,
    pub engine: EngineState,
    pub cycle: CycleId,
    pub result: Option<GenerationResult>,
    /// Asset URL in the variant of the engine last selected.
    pub asset_url: Option<String>,
    pub refresh_token: u64,
    pub active_tab: ResultTab,
    pub logs: Vec<String>,
    pub copied: bool,
    copy_token: u64,
    awaiting: Awaiting,
}

impl ControllerState {
    pub fn display_url(&self) -> Option<String> {
        self.asset_url.as_deref().map(|u| cache_busted(u, self.refresh_token))
    }
}

/// Tab content derived from state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabView {
    AwaitingInput,
    Strategy { hook: String, offer: String, cta: String, captions: Vec<String>, copied: bool },
    Visuals { image: Option<String>, badge: &'static str, status: Option<[&'static str; 3]> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub lifecycle: LifecycleState,
    pub loading: bool,
    pub can_submit: bool,
    pub logs: Vec<String>,
    pub tab: TabView,
}

pub struct Controller {
    state: ControllerState,
    policy: RerenderPolicy,
}

impl Controller {
    pub fn new(policy: RerenderPolicy) -> Self {
        Self { state: ControllerState::default(), policy }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::EditBusiness(v) => {
                self.state.business_type = v;
                Vec::new()
            }
            Event::EditTopic(v) => {
                self.state.topic = v;
                Vec::new()
            }
            Event::Submit => self.submit(),
            Event::ForceRerender => self.force_rerender(),
            Event::SelectTab(tab) => {
                self.state.active_tab = tab;
                Vec::new()
            }
            Event::CopyToClipboard => self.copy(),
            Event::CopyExpired { token } => {
                if token == self.state.copy_token {
                    self.state.copied = false;
                }
                Vec::new()
            }
            Event::Response { cycle, outcome } => {
                if !self.accepts(cycle, Awaiting::Response) {
                    return Vec::new();
                }
                self.on_response(cycle, outcome)
            }
            Event::FallbackElapsed { cycle } => {
                if !self.is_live(cycle) {
                    return Vec::new();
                }
                self.on_fallback(cycle)
            }
            Event::NarratorLine { cycle, line } => {
                if self.is_live(cycle) {
                    self.state.logs.push(format!("> {line}"));
                }
                Vec::new()
            }
            Event::AssetLoaded { cycle, url, outcome } => {
                if !self.accepts(cycle, Awaiting::Asset) || self.state.display_url().as_deref() != Some(url.as_str()) {
                    debug!(%cycle, %url, "dropping asset completion for a superseded request");
                    return Vec::new();
                }
                self.finish(cycle, LifecycleState::Complete);
                let mut effects = vec![Effect::CancelTimers { cycle }];
                if let Err(e) = outcome {
                    debug!(%cycle, error = %e, "asset refresh failed");
                    effects.push(Effect::Notify("Visual could not be refreshed. Try again.".into()));
                }
                effects
            }
        }
    }

    /// Pure view derivation.
    pub fn view(&self) -> View {
        let s = &self.state;
        let loading = s.lifecycle == LifecycleState::InFlight;
        let tab = match (&s.result, s.active_tab) {
            (None, _) => TabView::AwaitingInput,
            (Some(r), ResultTab::Strategy) => TabView::Strategy {
                hook: r.hook.clone(),
                offer: r.offer.clone(),
                cta: r.cta.clone(),
                captions: r.captions.clone(),
                copied: s.copied,
            },
            (Some(_), ResultTab::Visuals) => TabView::Visuals {
                image: s.display_url(),
                badge: s.engine.badge(),
                status: loading.then(|| s.engine.status_lines()),
            },
        };
        View {
            lifecycle: s.lifecycle,
            loading,
            can_submit: !loading && validate(&s.business_type, &s.topic).is_ok(),
            logs: if loading { s.logs.clone() } else { Vec::new() },
            tab,
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.state.lifecycle == LifecycleState::InFlight {
            debug!(cycle = %self.state.cycle, "submit ignored while a cycle is in flight");
            return Vec::new();
        }
        self.start_request_cycle()
    }

    fn start_request_cycle(&mut self) -> Vec<Effect> {
        let request = match validate(&self.state.business_type, &self.state.topic) {
            Ok(r) => r,
            Err(e) => return vec![Effect::Notify(e.user_message().to_string())],
        };
        let mut effects = self.enter_in_flight(Awaiting::Response);
        let cycle = self.state.cycle;
        self.state.result = None;
        self.state.asset_url = None;
        self.state.copied = false;
        effects.push(Effect::StartNarrator { cycle, steps: narrator::script(&request.business_type) });
        effects.push(Effect::StartFallbackTimer { cycle });
        effects.push(Effect::SendRequest { cycle, request });
        effects
    }

    fn force_rerender(&mut self) -> Vec<Effect> {
        let Some(result) = &self.state.result else {
            return Vec::new();
        };
        match self.policy {
            RerenderPolicy::Full => {
                let effects = self.start_request_cycle();
                if self.state.lifecycle == LifecycleState::InFlight {
                    self.state.refresh_token += 1;
                }
                effects
            }
            RerenderPolicy::Asset => {
                if result.image_url.is_empty() {
                    return Vec::new();
                }
                let primary_url = result.image_url.clone();
                let mut effects = self.enter_in_flight(Awaiting::Asset);
                let cycle = self.state.cycle;
                self.state.refresh_token += 1;
                self.state.asset_url = Some(primary_url);
                effects.push(Effect::StartNarrator { cycle, steps: narrator::script(&self.state.business_type) });
                effects.push(Effect::StartFallbackTimer { cycle });
                if let Some(url) = self.state.display_url() {
                    effects.push(Effect::FetchAsset { cycle, url });
                }
                effects
            }
        }
    }

    /// New cycle id, engine back to primary, previous cycle's timers cancelled.
    fn enter_in_flight(&mut self, awaiting: Awaiting) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state.lifecycle == LifecycleState::InFlight {
            effects.push(Effect::CancelTimers { cycle: self.state.cycle });
        }
        self.state.cycle = self.state.cycle.next();
        self.state.lifecycle = LifecycleState::InFlight;
        self.state.engine = EngineState::Primary;
        self.state.logs.clear();
        self.state.awaiting = awaiting;
        debug!(cycle = %self.state.cycle, ?awaiting, "cycle started");
        effects
    }

    fn on_response(&mut self, cycle: CycleId, outcome: Result<GenerationResult, GenerationError>) -> Vec<Effect> {
        match outcome {
            Ok(result) => {
                self.state.asset_url = match (result.image_url.is_empty(), self.state.engine) {
                    (true, _) => None,
                    (false, EngineState::Primary) => Some(result.image_url.clone()),
                    (false, EngineState::Fallback) => Some(to_fallback_url(&result.image_url)),
                };
                self.state.result = Some(result);
                self.finish(cycle, LifecycleState::Complete);
                vec![Effect::CancelTimers { cycle }]
            }
            Err(e) => {
                debug!(%cycle, error = %e, "generation failed");
                self.state.result = None;
                self.state.asset_url = None;
                self.finish(cycle, LifecycleState::Failed);
                vec![Effect::CancelTimers { cycle }, Effect::Notify(e.user_message().to_string())]
            }
        }
    }

    fn on_fallback(&mut self, cycle: CycleId) -> Vec<Effect> {
        if self.state.engine == EngineState::Fallback {
            return Vec::new();
        }
        self.state.engine = EngineState::Fallback;
        debug!(%cycle, "engine switched to fallback");
        let Some(url) = self.state.asset_url.take() else {
            return Vec::new();
        };
        self.state.asset_url = Some(to_fallback_url(&url));
        match (self.state.awaiting, self.state.display_url()) {
            (Awaiting::Asset, Some(url)) => vec![Effect::FetchAsset { cycle, url }],
            _ => Vec::new(),
        }
    }

    fn finish(&mut self, cycle: CycleId, outcome: LifecycleState) {
        self.state.lifecycle = outcome;
        self.state.awaiting = Awaiting::Nothing;
        debug!(%cycle, ?outcome, engine = ?self.state.engine, "cycle finished");
    }

    fn copy(&mut self) -> Vec<Effect> {
        let Some(result) = &self.state.result else {
            return Vec::new();
        };
        let text = result.clipboard_text();
        self.state.copied = true;
        self.state.copy_token += 1;
        vec![Effect::WriteClipboard(text), Effect::ScheduleCopyReset { token: self.state.copy_token }]
    }

    fn is_live(&self, cycle: CycleId) -> bool {
        let live = cycle == self.state.cycle && self.state.lifecycle == LifecycleState::InFlight;
        if !live {
            debug!(stale = %cycle, current = %self.state.cycle, "dropping stale callback");
        }
        live
    }

    fn accepts(&self, cycle: CycleId, awaiting: Awaiting) -> bool {
        self.is_live(cycle) && self.state.awaiting == awaiting
    }
}

fn validate(business_type: &str, topic: &str) -> Result<GenerationRequest, GenerationError> {
    let (b, t) = (business_type.trim(), topic.trim());
    if b.is_empty() {
        return Err(GenerationError::Validation("businessType"));
    }
    if t.is_empty() {
        return Err(GenerationError::Validation("topic"));
    }
    Ok(GenerationRequest::new(b, t))
}
