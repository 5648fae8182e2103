use async_trait::async_trait;
use common::{GenerationRequest, GenerationResponse};
use tracing::debug;

use crate::error::TransportError;

/// The remote generation call: one request, one response.
#[async_trait]
pub trait GenerationService: Send + Sync + 'static {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, TransportError>;
}

/// `POST <endpoint>/generate` over HTTP.
///
/// The body is decoded whatever the status code: the service reports its own
/// failures as an `{"errored": true, ...}` body with status 500.
#[derive(Debug, Clone)]
pub struct HttpGenerationService {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpGenerationService {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(endpoint, http_client))
    }

    pub fn with_client(endpoint: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client,
        }
    }

    pub fn url(&self) -> String {
        format!("{}/generate", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, TransportError> {
        let url = self.url();
        debug!(url = %url, query_len = request.query.len(), "Posting generation request");

        let response = self.http_client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Generation response received");

        Ok(GenerationResponse::decode(&body)?)
    }
}
