use serde::{Deserialize, Deserializer, Serialize};

use crate::Document;
use crate::error::ProtocolError;

/// Text shown when the service reports a failure without any message.
pub const DEFAULT_ERROR: &str = "500: Internal Server Error";

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

/// Body returned by `POST /generate`, also embedded in the page bootstrap.
///
/// The service serializes absent strings as `""` and absent file lists as
/// `null`; both decode to "absent" here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub sha: Option<String>,
    #[serde(default)]
    pub errored: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub files: Vec<Document>,
}

impl GenerationRequest {
    pub fn new(query: impl Into<String>, config: Option<String>) -> Self {
        Self {
            query: query.into(),
            config,
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(body: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(body)?)
    }
}

impl GenerationResponse {
    pub fn success(sha: Option<String>, files: Vec<Document>) -> Self {
        Self {
            sha,
            errored: false,
            error: None,
            files,
        }
    }

    pub fn failure(error: Option<String>) -> Self {
        Self {
            sha: None,
            errored: true,
            error,
            files: Vec::new(),
        }
    }

    /// The message for the error pane, falling back to [`DEFAULT_ERROR`].
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or(DEFAULT_ERROR)
    }

    /// Location path identifying the persisted session, if any.
    pub fn session_path(&self) -> Option<String> {
        self.sha.as_ref().map(|sha| format!("/p/{}", sha))
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(body: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(body)?)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Document>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Document>>::deserialize(deserializer)?.unwrap_or_default())
}
