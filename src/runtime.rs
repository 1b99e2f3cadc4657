//! Event loop that owns the controller and performs its effects.
//!
//! All controller mutation happens on this loop. Spawned tasks (request,
//! watchdog, narrator, asset fetch, copy reset) only post events back, tagged
//! with the cycle or token they were started for.

use std::{pin::pin, sync::Arc};

use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    client::GenerationBackend,
    config::StudioConfig,
    controller::{Controller, CycleId, Effect, Event, View},
    fallback::{self, CancelHandle},
    narrator,
};

/// Presentation side: whatever draws the view and talks to the user.
pub trait Surface {
    fn render(&mut self, view: &View);
    fn write_clipboard(&mut self, text: &str);
    fn notify(&mut self, message: &str);
}

pub struct Runtime<S: Surface> {
    controller: Controller,
    backend: Arc<dyn GenerationBackend>,
    surface: S,
    config: StudioConfig,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    watchdog: Option<(CycleId, CancelHandle)>,
    narrator: Option<(CycleId, JoinHandle<()>)>,
}

impl<S: Surface> Runtime<S> {
    pub fn new(controller: Controller, backend: Arc<dyn GenerationBackend>, surface: S, config: StudioConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { controller, backend, surface, config, tx, rx, watchdog: None, narrator: None }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Processes user input and callbacks until `input` closes.
    pub async fn run(mut self, mut input: mpsc::Receiver<Event>) -> Controller {
        self.surface.render(&self.controller.view());
        loop {
            tokio::select! {
                biased;
                Some(event) = self.rx.recv() => self.dispatch(event),
                event = input.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
            }
        }
        self.cancel_all();
        info!("👋 Studio closed");
        self.controller
    }

    /// Next callback posted by a spawned task.
    #[cfg(test)]
    async fn next_callback(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn dispatch(&mut self, event: Event) {
        let effects = self.controller.handle(event);
        for effect in effects {
            self.perform(effect);
        }
        self.surface.render(&self.controller.view());
    }

    fn perform(&mut self, effect: Effect) {
        debug!(?effect, "performing effect");
        match effect {
            Effect::SendRequest { cycle, request } => {
                let backend = self.backend.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = backend.submit(request).await;
                    let _ = tx.send(Event::Response { cycle, outcome });
                });
            }
            Effect::StartNarrator { cycle, steps } => {
                let tx = self.tx.clone();
                let interval = self.config.narrator_interval;
                let task = tokio::spawn(async move {
                    let mut lines = pin!(narrator::produce(steps, interval));
                    while let Some(line) = lines.next().await {
                        if tx.send(Event::NarratorLine { cycle, line }).is_err() {
                            break;
                        }
                    }
                });
                if let Some((_, old)) = self.narrator.replace((cycle, task)) {
                    old.abort();
                }
            }
            Effect::StartFallbackTimer { cycle } => {
                let tx = self.tx.clone();
                let handle = fallback::start(self.config.grace_period, move || {
                    let _ = tx.send(Event::FallbackElapsed { cycle });
                });
                self.watchdog = Some((cycle, handle));
            }
            Effect::CancelTimers { cycle } => {
                if self.watchdog.as_ref().is_some_and(|(c, _)| *c == cycle) {
                    if let Some((_, handle)) = self.watchdog.take() {
                        fallback::cancel(handle);
                    }
                }
                if self.narrator.as_ref().is_some_and(|(c, _)| *c == cycle) {
                    if let Some((_, task)) = self.narrator.take() {
                        task.abort();
                    }
                }
            }
            Effect::FetchAsset { cycle, url } => {
                let backend = self.backend.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = backend.fetch_asset(&url).await;
                    let _ = tx.send(Event::AssetLoaded { cycle, url, outcome });
                });
            }
            Effect::WriteClipboard(text) => self.surface.write_clipboard(&text),
            Effect::ScheduleCopyReset { token } => {
                let tx = self.tx.clone();
                let after = self.config.copy_reset;
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Event::CopyExpired { token });
                });
            }
            Effect::Notify(message) => self.surface.notify(&message),
        }
    }

    fn cancel_all(&mut self) {
        if let Some((_, handle)) = self.watchdog.take() {
            fallback::cancel(handle);
        }
        if let Some((_, task)) = self.narrator.take() {
            task.abort();
        }
    }

    #[cfg(test)]
    fn timers_pending(&self) -> bool {
        self.watchdog.is_some() || self.narrator.as_ref().is_some_and(|(_, t)| !t.is_finished())
    }
}
