use common::error::DocumentError;
use common::{DocumentSet, GenerationResponse};
use tracing::{info, warn};

use crate::tabs::{PaneKind, TabController};
use crate::widget::{Editor, ErrorPane};

/// Label shown in front of the output tabs.
pub const OUTPUT_HEADER: &str = "Output";

/// Owns the read-only output pane and the error pane.
///
/// Only [`render`](Self::render) and [`select_tab`](Self::select_tab) change
/// what the output editor displays.
pub struct OutputRenderer {
    tabs: TabController,
    editor: Box<dyn Editor>,
    errors: Box<dyn ErrorPane>,
    renders: u64,
    showing_error: bool,
}

impl OutputRenderer {
    pub fn new(output_suffix: &str, editor: Box<dyn Editor>, errors: Box<dyn ErrorPane>) -> Self {
        Self {
            tabs: TabController::new(PaneKind::Output, output_suffix).with_header(OUTPUT_HEADER),
            editor,
            errors,
            renders: 0,
            showing_error: false,
        }
    }

    pub fn render(&mut self, response: &GenerationResponse) {
        self.renders += 1;

        if response.errored {
            let text = response.error_text();
            warn!(error = %text, "Generation reported an error");
            self.editor.set_visible(false);
            self.errors.set_visible(true);
            self.errors.set_text(text);
            self.showing_error = true;
            return;
        }

        self.errors.set_visible(false);
        self.editor.set_visible(true);
        self.showing_error = false;
        self.tabs.load(
            DocumentSet::from_documents(response.files.iter().cloned()),
            self.editor.as_mut(),
        );
        info!(
            files = response.files.len(),
            selected = ?self.tabs.selected_name(),
            "Rendered generated output"
        );
    }

    pub fn select_tab(&mut self, name: &str) -> Result<String, DocumentError> {
        self.tabs.select(name, self.editor.as_mut())
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn displayed(&self) -> String {
        self.editor.value()
    }

    pub fn showing_error(&self) -> bool {
        self.showing_error
    }

    /// Number of responses rendered so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }
}
