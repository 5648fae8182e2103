use std::sync::{Arc, Mutex};

use common::GenerationResponse;
use tracing::{debug, warn};

/// The browser-visible location of the page.
pub trait Location: Send {
    fn path(&self) -> String;
    /// Replaces the current entry in place; never pushes a new one.
    fn replace(&mut self, path: &str);
    fn history_len(&self) -> usize;
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
}

/// In-process location with a history stack that `replace` never grows.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    history: Arc<Mutex<History>>,
}

impl MemoryLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            history: Arc::new(Mutex::new(History {
                entries: vec![path.into()],
            })),
        }
    }

    fn with_history<T>(&self, f: impl FnOnce(&mut History) -> T) -> T {
        let mut history = match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Location mutex was poisoned. Data might be in an inconsistent state.");
                poisoned.into_inner()
            }
        };
        f(&mut history)
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Location for MemoryLocation {
    fn path(&self) -> String {
        self.with_history(|history| history.entries.last().cloned().unwrap_or_default())
    }

    fn replace(&mut self, path: &str) {
        self.with_history(|history| match history.entries.last_mut() {
            Some(current) => *current = path.to_string(),
            None => history.entries.push(path.to_string()),
        });
    }

    fn history_len(&self) -> usize {
        self.with_history(|history| history.entries.len())
    }
}

/// Projects the session identifier of a response onto the location.
pub struct UrlState {
    location: Box<dyn Location>,
}

impl UrlState {
    pub fn new(location: Box<dyn Location>) -> Self {
        Self { location }
    }

    /// Replaces the location with `/p/<sha>` when the response carries a
    /// sha. Returns whether the location was touched.
    pub fn apply(&mut self, response: &GenerationResponse) -> bool {
        let Some(path) = response.session_path() else {
            return false;
        };
        debug!(path = %path, "Replacing location");
        self.location.replace(&path);
        true
    }

    pub fn path(&self) -> String {
        self.location.path()
    }
}
