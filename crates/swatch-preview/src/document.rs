//! Preview document builder.

use swatch_normalize::CanonicalUnit;

use crate::assets::AssetPipeline;
use crate::config::PreviewConfig;
use crate::probe::probe_script;
use crate::templates::{DocumentContext, TemplateEngine};

/// Id of the element every preview mounts into.
pub const MOUNT_ID: &str = "root";

/// A complete, self-contained preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    html: String,
    unit: CanonicalUnit,
}

impl PreviewDocument {
    /// The document markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The unit embedded in the document.
    pub fn unit(&self) -> &CanonicalUnit {
        &self.unit
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

/// Errors that can occur while building a document.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to render template: {0}")]
    TemplateError(#[from] minijinja::Error),
}

/// Builds preview documents.
///
/// Holds only immutable state, so one builder can serve any number of
/// concurrent requests; every call produces an independent document.
pub struct PreviewBuilder {
    config: PreviewConfig,
    css: String,
    probe: String,
    templates: TemplateEngine,
}

impl PreviewBuilder {
    /// Create a new builder.
    pub fn new(config: PreviewConfig) -> Self {
        let css = AssetPipeline::preview_css(config.minify);
        let probe = probe_script(MOUNT_ID, config.settle_ms);

        Self {
            config,
            css,
            probe,
            templates: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Build a preview document around a canonical unit.
    pub fn build(&self, unit: &CanonicalUnit) -> Result<PreviewDocument, BuildError> {
        let embedded = guard_script_close(unit.escaped());
        let assets = &self.config.assets;

        let html = self.templates.render_document(&DocumentContext {
            title: &self.config.title,
            react: &assets.react,
            react_dom: &assets.react_dom,
            babel: &assets.babel,
            tailwind: assets.tailwind.as_deref().filter(|url| !url.is_empty()),
            css: &self.css,
            mount_id: MOUNT_ID,
            unit: &embedded,
            probe: &self.probe,
        })?;

        tracing::debug!("Built preview document ({} bytes)", html.len());

        Ok(PreviewDocument {
            html,
            unit: unit.clone(),
        })
    }
}

impl Default for PreviewBuilder {
    fn default() -> Self {
        Self::new(PreviewConfig::default())
    }
}

/// Keep embedded text from terminating the surrounding script element.
///
/// `<\/` and `<\!--` read back as `</` and `<!--` inside a template literal.
fn guard_script_close(escaped: &str) -> String {
    escaped.replace("</", "<\\/").replace("<!--", "<\\!--")
}
