use tracing::warn;

use crate::Document;
use crate::error::DocumentError;

/// Ordered set of uniquely named documents backing one pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set preserving the incoming order. A repeated name keeps its
    /// first occurrence.
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut set = Self::new();
        for doc in documents {
            if set.contains(&doc.name) {
                warn!(name = %doc.name, "Dropping duplicate document");
                continue;
            }
            set.documents.push(doc);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.documents.iter().position(|doc| doc.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.name == name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Index of the first document whose name ends with `suffix`.
    pub fn primary_index(&self, suffix: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| doc.matches_suffix(suffix))
    }

    pub fn primary(&self, suffix: &str) -> Option<&Document> {
        self.primary_index(suffix)
            .and_then(|index| self.documents.get(index))
    }

    pub fn replace_content(&mut self, name: &str, content: String) -> Result<(), DocumentError> {
        let doc = self
            .documents
            .iter_mut()
            .find(|doc| doc.name == name)
            .ok_or_else(|| DocumentError::UnknownDocument(name.to_string()))?;
        doc.content = content;
        Ok(())
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl FromIterator<Document> for DocumentSet {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self::from_documents(iter)
    }
}
