//! Types shared by normalizer implementations.

use serde::Serialize;

use crate::escape::escape_template_literal;

/// Name every canonical unit binds its component to.
pub const RESERVED_ENTRY: &str = "App";

/// A snippet rewritten so that evaluating it defines [`RESERVED_ENTRY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUnit {
    source: String,
    escaped: String,
}

impl CanonicalUnit {
    /// Wrap canonical source, computing its template-literal escaped form.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let escaped = escape_template_literal(&source);
        Self { source, escaped }
    }

    /// The canonical source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The source escaped for embedding between backticks.
    pub fn escaped(&self) -> &str {
        &self.escaped
    }

    pub fn into_source(self) -> String {
        self.source
    }
}

/// How the entry binding was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// `const Name = ...`
    Constant,
    /// `function Name(...)`
    Function,
    /// Bare markup wrapped in a zero-argument arrow function
    Markup,
    /// Anything else, bound whole as the entry constant
    Expression,
}

/// Non-fatal observations made while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationWarning {
    /// More than one declaration could be the entry; the first by priority was used.
    AmbiguousEntry { chosen: String, others: Vec<String> },

    /// No declaration found, the whole text was bound as an expression.
    FallbackExpression,

    /// Bare markup was wrapped in a component function.
    MarkupWrapped,

    /// The chosen entry is not capitalized, so it may not be a component.
    NonComponentName { name: String },
}

impl std::fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmbiguousEntry { chosen, others } => write!(
                f,
                "several entry candidates found, using '{}' (ignored: {})",
                chosen,
                others.join(", ")
            ),
            Self::FallbackExpression => {
                write!(f, "no component declaration found, treating snippet as an expression")
            }
            Self::MarkupWrapped => write!(f, "bare markup wrapped in a component"),
            Self::NonComponentName { name } => {
                write!(f, "entry '{}' does not look like a component name", name)
            }
        }
    }
}

/// Result of normalizing one snippet.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// The canonical unit
    pub unit: CanonicalUnit,

    /// Shape of the entry binding
    pub entry: EntryKind,

    /// Name the entry had before renaming (declarations only)
    pub original_name: Option<String>,

    /// Everything the normalizer had to guess about
    pub warnings: Vec<NormalizationWarning>,
}

/// A strategy for turning snippet text into a canonical unit.
///
/// Implementations must be total: malformed input degrades to a best-effort
/// unit plus warnings instead of an error.
pub trait SourceNormalizer: Send + Sync {
    /// Identifier for logs (e.g., "pattern")
    fn name(&self) -> &'static str;

    /// Normalize snippet text.
    fn normalize(&self, source: &str) -> Normalized;
}
