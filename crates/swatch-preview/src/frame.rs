//! Sandboxed frame embedding for preview documents.
//!
//! The frame gets `sandbox="allow-scripts"` and nothing else: scripts run,
//! but without same-origin privileges, so the document can reach the host
//! only through `postMessage`.

use crate::document::{BuildError, PreviewDocument};
use crate::probe::{listener_script, sanitize_id};
use crate::resize::FrameSizing;
use crate::templates::{FrameContext, TemplateEngine};

/// Render an `<iframe>` for a document plus the listener that sizes it.
pub fn render_frame(
    templates: &TemplateEngine,
    frame_id: &str,
    title: &str,
    document: &PreviewDocument,
    sizing: FrameSizing,
) -> Result<String, BuildError> {
    let frame_id = sanitize_id(frame_id);
    let listener = listener_script(&frame_id, sizing);

    let html = templates.render_frame(&FrameContext {
        frame_id: &frame_id,
        title,
        height: sizing.min_height,
        document: document.html(),
        listener: &listener,
    })?;

    Ok(html)
}
