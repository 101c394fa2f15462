//! Preview document configuration.

use serde::Deserialize;

/// External runtime and styling assets referenced by every preview document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetUrls {
    /// Rendering runtime (UMD build exposing `React`)
    #[serde(default = "default_react")]
    pub react: String,

    /// Mount/unmount companion runtime (UMD build exposing `ReactDOM`)
    #[serde(default = "default_react_dom")]
    pub react_dom: String,

    /// In-browser source transformer (exposing `Babel`)
    #[serde(default = "default_babel")]
    pub babel: String,

    /// Utility-class styling engine, omitted when unset or empty
    #[serde(default = "default_tailwind")]
    pub tailwind: Option<String>,
}

fn default_react() -> String {
    "https://unpkg.com/react@18/umd/react.development.js".to_string()
}
fn default_react_dom() -> String {
    "https://unpkg.com/react-dom@18/umd/react-dom.development.js".to_string()
}
fn default_babel() -> String {
    "https://unpkg.com/@babel/standalone/babel.min.js".to_string()
}
fn default_tailwind() -> Option<String> {
    Some("https://cdn.tailwindcss.com".to_string())
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self {
            react: default_react(),
            react_dom: default_react_dom(),
            babel: default_babel(),
            tailwind: default_tailwind(),
        }
    }
}

/// Configuration for building preview documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreviewConfig {
    /// Document title
    #[serde(default = "default_title")]
    pub title: String,

    /// Minify the embedded stylesheet
    #[serde(default)]
    pub minify: bool,

    /// Delay before the eager post-mount resize report, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u32,

    #[serde(default)]
    pub assets: AssetUrls,
}

fn default_title() -> String {
    "Preview".to_string()
}
fn default_settle_ms() -> u32 {
    50
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            minify: false,
            settle_ms: default_settle_ms(),
            assets: AssetUrls::default(),
        }
    }
}
