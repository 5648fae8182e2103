//! Capabilities the engine needs from the page: an editor per pane, the
//! error pane, and in-memory implementations of both.
//!
//! The in-memory widgets are cheap handles over shared state, so a front end
//! or a test can keep a clone and observe what the session displays.

use std::sync::{Arc, Mutex, MutexGuard};

use common::Document;
use tracing::warn;

/// A text editor bound to one pane.
pub trait Editor: Send {
    /// Current text of the displayed document.
    fn value(&self) -> String;
    /// Replaces the current text, as a user keystroke would.
    fn set_value(&mut self, text: &str);
    /// Swaps the displayed document.
    fn set_document(&mut self, doc: &Document);
    fn set_visible(&mut self, visible: bool);
}

/// The pane that shows a failed generation.
pub trait ErrorPane: Send {
    fn set_text(&mut self, text: &str);
    fn set_visible(&mut self, visible: bool);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub document: Option<Document>,
    pub text: String,
    pub visible: bool,
    /// Number of `set_document` calls received.
    pub swaps: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BufferEditor {
    state: Arc<Mutex<EditorState>>,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> EditorState {
        lock(&self.state).clone()
    }

    pub fn text(&self) -> String {
        lock(&self.state).text.clone()
    }

    /// Name of the displayed document, if any.
    pub fn document_name(&self) -> Option<String> {
        lock(&self.state).document.as_ref().map(|doc| doc.name.clone())
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }

    pub fn swaps(&self) -> usize {
        lock(&self.state).swaps
    }
}

impl Editor for BufferEditor {
    fn value(&self) -> String {
        self.text()
    }

    fn set_value(&mut self, text: &str) {
        lock(&self.state).text = text.to_string();
    }

    fn set_document(&mut self, doc: &Document) {
        let mut state = lock(&self.state);
        state.text = doc.content.clone();
        state.document = Some(doc.clone());
        state.swaps += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        lock(&self.state).visible = visible;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorPaneState {
    pub text: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TextErrorPane {
    state: Arc<Mutex<ErrorPaneState>>,
}

impl TextErrorPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        lock(&self.state).text.clone()
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }
}

impl ErrorPane for TextErrorPane {
    fn set_text(&mut self, text: &str) {
        lock(&self.state).text = text.to_string();
    }

    fn set_visible(&mut self, visible: bool) {
        lock(&self.state).visible = visible;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Widget mutex was poisoned. Data might be in an inconsistent state.");
            poisoned.into_inner()
        }
    }
}
