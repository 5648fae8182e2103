use std::fmt;
use std::str::FromStr;

use common::error::DocumentError;
use common::{Document, DocumentSet};
use tracing::debug;

use crate::widget::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneKind {
    Input,
    Output,
}

impl PaneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaneKind::Input => "input",
            PaneKind::Output => "output",
        }
    }
}

impl fmt::Display for PaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaneKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(PaneKind::Input),
            "output" => Ok(PaneKind::Output),
            other => Err(format!("Unknown pane: {}", other)),
        }
    }
}

/// One entry of a pane's tab list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub label: String,
    /// Fragment link for the tab, e.g. `#output=query.sql.go`.
    pub anchor: String,
    pub selected: bool,
}

/// Tab list of one pane, paired with the editor that displays the selected
/// document.
///
/// The pairing tab ⇄ document ⇄ displayed text is kept in lockstep: the
/// editor only ever receives a document through [`TabController::load`] or
/// [`TabController::select`].
#[derive(Debug, Clone)]
pub struct TabController {
    pane: PaneKind,
    default_suffix: String,
    header: Option<String>,
    documents: DocumentSet,
    tabs: Vec<Tab>,
    selected: Option<usize>,
    rebuilds: usize,
}

impl TabController {
    pub fn new(pane: PaneKind, default_suffix: impl Into<String>) -> Self {
        Self {
            pane,
            default_suffix: default_suffix.into(),
            header: None,
            documents: DocumentSet::new(),
            tabs: Vec::new(),
            selected: None,
            rebuilds: 0,
        }
    }

    /// Adds a fixed, non-selectable label in front of the tabs.
    pub fn with_header(mut self, label: impl Into<String>) -> Self {
        self.header = Some(label.into());
        self
    }

    /// Replaces the whole set and rebuilds the tab list.
    ///
    /// The previous selection is discarded; the first document matching the
    /// pane's default suffix is selected. When nothing matches, no tab is
    /// selected and the editor is cleared.
    pub fn load(&mut self, documents: DocumentSet, editor: &mut dyn Editor) {
        self.tabs = documents
            .names()
            .map(|name| Tab {
                label: name.to_string(),
                anchor: format!("#{}={}", self.pane, name),
                selected: false,
            })
            .collect();
        self.documents = documents;
        self.selected = None;
        self.rebuilds += 1;

        match self.documents.primary_index(&self.default_suffix) {
            Some(index) => self.swap(index, editor),
            None => {
                debug!(pane = %self.pane, suffix = %self.default_suffix, "No default document to select");
                editor.set_document(&Document::blank());
            }
        }
    }

    /// Selects the named tab and returns the text now displayed.
    ///
    /// Selecting the tab that is already selected changes nothing; the
    /// editor keeps its document (and with it cursor and scroll state).
    pub fn select(&mut self, name: &str, editor: &mut dyn Editor) -> Result<String, DocumentError> {
        let index = self
            .documents
            .position(name)
            .ok_or_else(|| DocumentError::UnknownDocument(name.to_string()))?;

        if self.selected == Some(index) {
            return Ok(editor.value());
        }

        // Keep what was typed into the outgoing document.
        if let Some(current) = self.selected_name().map(str::to_string) {
            self.documents.replace_content(&current, editor.value())?;
        }

        self.swap(index, editor);
        Ok(editor.value())
    }

    fn swap(&mut self, index: usize, editor: &mut dyn Editor) {
        let Some(doc) = self.documents.get_index(index) else {
            return;
        };
        editor.set_document(doc);
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.selected = i == index;
        }
        self.selected = Some(index);
        debug!(pane = %self.pane, name = %doc.name, "Selected tab");
    }

    /// The set with the selected document's content taken from the live
    /// editor.
    pub fn snapshot(&self, editor: &dyn Editor) -> DocumentSet {
        let mut documents = self.documents.clone();
        if let Some(name) = self.selected_name() {
            // The name comes from the set itself, so this cannot miss.
            let _ = documents.replace_content(name, editor.value());
        }
        documents
    }

    pub fn pane(&self) -> PaneKind {
        self.pane
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn selected(&self) -> Option<&Document> {
        self.selected
            .and_then(|index| self.documents.get_index(index))
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected().map(|doc| doc.name.as_str())
    }

    /// How many times the tab list has been rebuilt.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}
