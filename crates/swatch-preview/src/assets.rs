//! Stylesheet embedded in preview documents.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The preview stylesheet, minified when requested.
    ///
    /// Falls back to the unminified sheet if lightningcss rejects it.
    pub fn preview_css(minify: bool) -> String {
        if !minify {
            return PREVIEW_CSS.to_string();
        }
        match Self::minify_css(PREVIEW_CSS) {
            Ok(css) => css,
            Err(e) => {
                tracing::warn!("Failed to minify preview CSS: {}", e);
                PREVIEW_CSS.to_string()
            }
        }
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const PREVIEW_CSS: &str = r#"* {
  box-sizing: border-box;
}

body {
  margin: 0;
  padding: 20px;
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
}

#root {
  display: block;
}

.preview-error {
  background: #7f1d1d;
  color: #fca5a5;
  padding: 16px;
  border-radius: 6px;
  font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
  font-size: 13px;
  white-space: pre-wrap;
  word-break: break-all;
}
"#;
