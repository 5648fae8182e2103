use std::sync::Arc;

use common::{DocumentSet, GenerationRequest, GenerationResponse};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use crate::config::PlaygroundConfig;
use crate::error::TransportError;
use crate::service::GenerationService;

/// What to do with a response that arrives after a newer one was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseOrdering {
    /// Drop responses older than the last rendered one.
    #[default]
    DiscardStale,
    /// Render every response in the order it arrives.
    Arrival,
}

/// Outcome of one remote call, posted back to the owner's channel.
#[derive(Debug)]
pub struct Completed {
    pub seq: u64,
    pub result: Result<GenerationResponse, TransportError>,
}

pub struct RequestPipeline {
    service: Arc<dyn GenerationService>,
    query_document: String,
    config_document: String,
    require_config: bool,
    ordering: ResponseOrdering,
    next_seq: u64,
    last_rendered: Option<u64>,
    in_flight: usize,
}

impl RequestPipeline {
    pub fn new(service: Arc<dyn GenerationService>, config: &PlaygroundConfig) -> Self {
        Self {
            service,
            query_document: config.query_document.clone(),
            config_document: config.config_document.clone(),
            require_config: config.require_config,
            ordering: config.ordering,
            next_seq: 0,
            last_rendered: None,
            in_flight: 0,
        }
    }

    /// Builds the request body, or `None` while the documents it needs have
    /// not been loaded.
    pub fn build_request(&self, documents: &DocumentSet) -> Option<GenerationRequest> {
        let query = documents.primary(&self.query_document)?;
        let config = documents
            .get(&self.config_document)
            .map(|doc| doc.content.clone());
        if self.require_config && config.is_none() {
            return None;
        }
        Some(GenerationRequest::new(query.content.clone(), config))
    }

    /// Issues one request for the current documents. Returns its sequence
    /// number, or `None` when the request was declined.
    ///
    /// The call runs as its own task and posts a [`Completed`] when it
    /// resolves. Nothing cancels it.
    pub fn on_quiet_period_elapsed<M>(
        &mut self,
        documents: &DocumentSet,
        sender: &UnboundedSender<M>,
    ) -> Option<u64>
    where
        M: From<Completed> + Send + 'static,
    {
        let Some(request) = self.build_request(documents) else {
            debug!("Input documents not loaded yet; not sending");
            return None;
        };

        self.next_seq += 1;
        self.in_flight += 1;
        let seq = self.next_seq;
        let service = Arc::clone(&self.service);
        let sender = sender.clone();
        tokio::spawn(async move {
            let result = service.generate(&request).await;
            let _ = sender.send(Completed { seq, result }.into());
        });

        info!(seq, in_flight = self.in_flight, "Generation request issued");
        Some(seq)
    }

    /// Filters a completed call down to the response that should be
    /// rendered. Transport failures are logged and yield nothing.
    pub fn accept(&mut self, completed: Completed) -> Option<GenerationResponse> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completed { seq, result } = completed;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(seq, error = %e, "Generation request failed; keeping last output");
                return None;
            }
        };

        if self.ordering == ResponseOrdering::DiscardStale
            && self.last_rendered.is_some_and(|last| seq < last)
        {
            debug!(seq, last_rendered = ?self.last_rendered, "Discarding stale response");
            return None;
        }

        self.last_rendered = Some(seq);
        Some(response)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_rendered(&self) -> Option<u64> {
        self.last_rendered
    }
}
