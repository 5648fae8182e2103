pub mod document;
pub use document::Document;

pub mod workspace;
pub use workspace::DocumentSet;

pub mod error;

pub mod protocol;
pub use protocol::{GenerationRequest, GenerationResponse};

pub mod bootstrap;
pub use bootstrap::Bootstrap;
