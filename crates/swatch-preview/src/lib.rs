//! Preview documents for untrusted component snippets.
//!
//! Builds a self-contained HTML document around a normalized snippet, embeds
//! it in a sandboxed frame, and defines the resize channel the frame uses to
//! report its content height back to the hosting page.

pub mod assets;
pub mod config;
pub mod document;
pub mod frame;
pub mod host;
pub mod probe;
pub mod resize;
pub mod templates;

pub use config::{AssetUrls, PreviewConfig};
pub use document::{BuildError, PreviewBuilder, PreviewDocument, MOUNT_ID};
pub use frame::render_frame;
pub use host::{
    Evaluator, ExecutionFault, IsolatedHost, MountContent, MountPoint, Rendered, StaticEvaluator,
};
pub use resize::{
    resize_channel, EmbeddedFrame, FrameSizing, InboundMessage, ListenerGuard, MessageBus,
    ResizeEmitter, ResizeError, ResizeMessage, ResizeReceiver,
};
pub use templates::TemplateEngine;
