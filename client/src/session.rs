//! The per-page controller tying the panes, the debounce timer and the
//! request pipeline together.
//!
//! Everything a session owns is mutated from one task: timers and remote
//! calls run as separate tasks but only post [`SessionEvent`]s back through
//! the session's channel.

use std::sync::Arc;

use common::{Bootstrap, DocumentSet};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{Span, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::PlaygroundConfig;
use crate::debounce::{DebounceScheduler, QuietPeriod};
use crate::error::SessionError;
use crate::location::{Location, UrlState};
use crate::pipeline::{Completed, RequestPipeline};
use crate::render::OutputRenderer;
use crate::service::GenerationService;
use crate::tabs::{PaneKind, TabController};
use crate::widget::{Editor, ErrorPane};

#[derive(Debug)]
pub enum SessionEvent {
    /// The input editor's text changed.
    EditOccurred,
    QuietPeriodElapsed(QuietPeriod),
    ResponseReceived(Completed),
    TabSelected { pane: PaneKind, name: String },
    Shutdown,
}

impl From<QuietPeriod> for SessionEvent {
    fn from(period: QuietPeriod) -> Self {
        SessionEvent::QuietPeriodElapsed(period)
    }
}

impl From<Completed> for SessionEvent {
    fn from(completed: Completed) -> Self {
        SessionEvent::ResponseReceived(completed)
    }
}

/// The page elements a session drives.
pub struct Widgets {
    pub input: Box<dyn Editor>,
    pub output: Box<dyn Editor>,
    pub errors: Box<dyn ErrorPane>,
    pub location: Box<dyn Location>,
}

/// Cloneable sender used by widget callbacks to reach the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.sender.send(event).map_err(|_| SessionError::Closed)
    }

    pub fn edit(&self) -> Result<(), SessionError> {
        self.send(SessionEvent::EditOccurred)
    }

    pub fn select_tab(&self, pane: PaneKind, name: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionEvent::TabSelected {
            pane,
            name: name.into(),
        })
    }

    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionEvent::Shutdown)
    }
}

pub struct Session {
    id: Uuid,
    span: Span,
    input_tabs: TabController,
    input_editor: Box<dyn Editor>,
    renderer: OutputRenderer,
    url: UrlState,
    debounce: DebounceScheduler<SessionEvent>,
    pipeline: RequestPipeline,
    sender: UnboundedSender<SessionEvent>,
    receiver: UnboundedReceiver<SessionEvent>,
}

impl Session {
    pub fn new(
        config: &PlaygroundConfig,
        widgets: Widgets,
        service: Arc<dyn GenerationService>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        let span = info_span!("session", id = %id);
        let Widgets {
            mut input,
            output,
            errors,
            location,
        } = widgets;
        input.set_visible(true);

        Self {
            id,
            span,
            input_tabs: TabController::new(PaneKind::Input, config.query_document.clone()),
            input_editor: input,
            renderer: OutputRenderer::new(&config.output_suffix, output, errors),
            url: UrlState::new(location),
            debounce: DebounceScheduler::new(config.debounce(), sender.clone()),
            pipeline: RequestPipeline::new(service, config),
            sender,
            receiver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            sender: self.sender.clone(),
        }
    }

    /// Consumes the embedded page payloads. Issues no request.
    pub fn bootstrap(&mut self, bootstrap: Bootstrap) {
        let _guard = self.span.clone().entered();
        if let Some(input) = bootstrap.input {
            info!(documents = input.len(), "Loading input documents");
            self.input_tabs.load(input, self.input_editor.as_mut());
        }
        if let Some(output) = bootstrap.output {
            self.show(&output);
        }
    }

    /// Processes one event. Returns `false` once the session has shut down.
    ///
    /// Timers and requests are spawned onto the current tokio runtime.
    pub fn dispatch(&mut self, event: SessionEvent) -> bool {
        let _guard = self.span.clone().entered();
        match event {
            SessionEvent::EditOccurred => {
                self.debounce.notify();
            }
            SessionEvent::QuietPeriodElapsed(period) => {
                if self.debounce.take(period) {
                    let documents = self.input_tabs.snapshot(self.input_editor.as_ref());
                    self.pipeline
                        .on_quiet_period_elapsed(&documents, &self.sender);
                }
            }
            SessionEvent::ResponseReceived(completed) => {
                if let Some(response) = self.pipeline.accept(completed) {
                    self.show(&response);
                }
            }
            SessionEvent::TabSelected { pane, name } => {
                let selected = match pane {
                    PaneKind::Input => self.input_tabs.select(&name, self.input_editor.as_mut()),
                    PaneKind::Output => self.renderer.select_tab(&name),
                };
                if let Err(e) = selected {
                    warn!(pane = %pane, error = %e, "Tab selection ignored");
                }
            }
            SessionEvent::Shutdown => {
                self.debounce.cancel();
                info!(in_flight = self.pipeline.in_flight(), "Session closed");
                return false;
            }
        }
        true
    }

    /// Waits for the next event without handling it.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.receiver.recv().await
    }

    /// Waits for and handles one event.
    pub async fn step(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => self.dispatch(event),
            None => false,
        }
    }

    /// Runs until a [`SessionEvent::Shutdown`] arrives.
    pub async fn run(mut self) {
        debug!(session = %self.id, "Session loop started");
        while self.step().await {}
    }

    fn show(&mut self, response: &common::GenerationResponse) {
        self.url.apply(response);
        self.renderer.render(response);
    }

    pub fn input_tabs(&self) -> &TabController {
        &self.input_tabs
    }

    /// Input documents with the live editor text applied.
    pub fn input_documents(&self) -> DocumentSet {
        self.input_tabs.snapshot(self.input_editor.as_ref())
    }

    pub fn output(&self) -> &OutputRenderer {
        &self.renderer
    }

    pub fn location(&self) -> String {
        self.url.path()
    }

    pub fn in_flight(&self) -> usize {
        self.pipeline.in_flight()
    }

    pub fn debounce_pending(&self) -> bool {
        self.debounce.is_pending()
    }
}
