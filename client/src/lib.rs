pub mod config;
pub mod debounce;
pub mod error;
pub mod location;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod service;
pub mod session;
pub mod tabs;
pub mod widget;

pub use config::PlaygroundConfig;
pub use session::{Session, SessionEvent, SessionHandle, Widgets};
