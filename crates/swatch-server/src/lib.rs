//! HTTP preview service for component snippets.
//!
//! Serves the render and normalize API, plus a playground page that embeds
//! a watched snippet and reloads it over a WebSocket whenever the file
//! changes.

pub mod error;
pub mod playground;
pub mod reload;
pub mod server;
pub mod watcher;

pub use error::{ApiError, ServerError};
pub use reload::{ReloadHub, ReloadMessage};
pub use server::{router, AppState, PreviewServer, ServerConfig};
pub use watcher::{FileWatcher, WatchEvent};
