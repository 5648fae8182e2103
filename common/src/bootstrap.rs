use crate::error::ProtocolError;
use crate::protocol::GenerationResponse;
use crate::{Document, DocumentSet};

/// Payloads embedded in the page on first load, consumed once without a
/// network call.
///
/// The input payload uses the same shape as a generation response; only its
/// `files` are read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bootstrap {
    pub input: Option<DocumentSet>,
    pub output: Option<GenerationResponse>,
}

impl Bootstrap {
    pub fn from_payloads(input: Option<&str>, output: Option<&str>) -> Result<Self, ProtocolError> {
        let input = match input {
            Some(body) => Some(Self::input_set(GenerationResponse::decode(body)?.files)),
            None => None,
        };
        let output = output.map(GenerationResponse::decode).transpose()?;
        Ok(Self { input, output })
    }

    /// Bootstrap for a fresh page with only the given input documents.
    pub fn with_input(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            input: Some(Self::input_set(documents)),
            output: None,
        }
    }

    fn input_set(documents: impl IntoIterator<Item = Document>) -> DocumentSet {
        // Input payloads may omit contentType; derive it from the name.
        documents
            .into_iter()
            .map(|doc| {
                if doc.content_type.is_empty() {
                    Document::for_file(doc.name, doc.content)
                } else {
                    doc
                }
            })
            .collect()
    }
}
