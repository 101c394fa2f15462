//! Regex-based normalizer.
//!
//! This is textual pattern matching, not parsing. It handles the shapes
//! component snippets usually come in and degrades to wrapping the whole
//! text when nothing matches.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::traits::{
    CanonicalUnit, EntryKind, NormalizationWarning, Normalized, SourceNormalizer, RESERVED_ENTRY,
};

/// Normalizer built on regular expressions.
#[derive(Debug, Default)]
pub struct PatternNormalizer;

impl PatternNormalizer {
    /// Create a new pattern normalizer.
    pub fn new() -> Self {
        Self
    }
}

impl SourceNormalizer for PatternNormalizer {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn normalize(&self, source: &str) -> Normalized {
        normalize(source)
    }
}

// Regex patterns for normalization
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: ```tsx, ```jsx live, ``` on their own line
    Regex::new(r"(?m)^[ \t]*`{3,}[^`\n]*$\n?").expect("Invalid fence regex")
});

static IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: import X, { Y } from 'module'; across lines
    Regex::new(r#"\bimport\s+[^;'"]*?\bfrom\s*['"][^'"\n]*['"][ \t]*;?"#)
        .expect("Invalid import regex")
});

static IMPORT_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: import './styles.css';
    Regex::new(r#"\bimport\s*['"][^'"\n]*['"][ \t]*;?"#).expect("Invalid bare import regex")
});

static EXPORT_DEFAULT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: export default Button;  (a trailing re-export of a declared name)
    Regex::new(r"(?m)^[ \t]*export\s+default\s+[A-Za-z_$][\w$]*[ \t]*;?[ \t]*$\n?")
        .expect("Invalid export default name regex")
});

static EXPORT_DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+default\s+").expect("Invalid export default regex"));

static EXPORT_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bexport\s+(const|let|var|function|class|async)\b")
        .expect("Invalid export declaration regex")
});

static CONST_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: const Name = / const Name: React.FC<Props> =
    Regex::new(r"\bconst\s+([A-Za-z_$][\w$]*)\s*(?::[^=;]+?)?\s*=[^=>]")
        .expect("Invalid const regex")
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: function Name( / function Name<T>(
    Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*(?:<[^>(]*>)?\s*\(")
        .expect("Invalid function regex")
});

/// A declaration that could be the snippet's entry.
#[derive(Debug, Clone)]
struct Candidate {
    kind: EntryKind,
    name: String,
    /// Byte range of the name inside the text
    span: Range<usize>,
    /// Brace nesting depth at the declaration
    depth: usize,
}

/// Normalize snippet text into a canonical unit.
///
/// Never fails: text that matches no known shape is bound whole as the
/// entry constant and a warning is recorded.
pub fn normalize(source: &str) -> Normalized {
    let stripped = strip_module_syntax(source);
    let text = stripped.trim();

    let candidates = find_candidates(text);

    let Some(chosen) = choose_entry(&candidates) else {
        return wrap_expression(text);
    };

    let mut warnings = Vec::new();

    let others: Vec<String> = candidates
        .iter()
        .filter(|c| c.depth == chosen.depth && c.span != chosen.span)
        .map(|c| c.name.clone())
        .collect();
    if !others.is_empty() {
        warnings.push(NormalizationWarning::AmbiguousEntry {
            chosen: chosen.name.clone(),
            others,
        });
    }

    if !chosen.name.starts_with(|c: char| c.is_ascii_uppercase()) {
        warnings.push(NormalizationWarning::NonComponentName {
            name: chosen.name.clone(),
        });
    }

    // Only the declaration is renamed; later references keep the old name.
    let mut canonical = String::with_capacity(text.len());
    canonical.push_str(&text[..chosen.span.start]);
    canonical.push_str(RESERVED_ENTRY);
    canonical.push_str(&text[chosen.span.end..]);

    Normalized {
        unit: CanonicalUnit::new(canonical),
        entry: chosen.kind,
        original_name: Some(chosen.name.clone()),
        warnings,
    }
}

/// Remove code fences, imports and export markers.
pub fn strip_module_syntax(source: &str) -> String {
    let mut text = source.to_string();

    if text.contains("```") {
        text = FENCE_RE.replace_all(&text, "").into_owned();
    }

    text = IMPORT_FROM_RE.replace_all(&text, "").into_owned();
    text = IMPORT_BARE_RE.replace_all(&text, "").into_owned();
    text = EXPORT_DEFAULT_NAME_RE.replace_all(&text, "").into_owned();
    text = EXPORT_DEFAULT_RE.replace_all(&text, "").into_owned();
    EXPORT_DECL_RE.replace_all(&text, "$1").into_owned()
}

/// Collect const and function declarations in source order.
fn find_candidates(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (kind, re) in [
        (EntryKind::Constant, &*CONST_RE),
        (EntryKind::Function, &*FUNCTION_RE),
    ] {
        for cap in re.captures_iter(text) {
            let Some(name) = cap.get(1) else { continue };
            candidates.push(Candidate {
                kind,
                name: name.as_str().to_string(),
                span: name.range(),
                depth: brace_depth(&text[..name.start()]),
            });
        }
    }

    candidates
}

/// Pick the entry declaration.
///
/// An existing declaration of the reserved name wins so normalizing twice
/// cannot produce two entries. Otherwise the shallowest declarations are
/// considered and constants take priority over functions.
fn choose_entry(candidates: &[Candidate]) -> Option<&Candidate> {
    if let Some(existing) = candidates.iter().find(|c| c.name == RESERVED_ENTRY) {
        return Some(existing);
    }

    let depth = candidates.iter().map(|c| c.depth).min()?;

    candidates
        .iter()
        .filter(|c| c.depth == depth)
        .find(|c| c.kind == EntryKind::Constant)
        .or_else(|| candidates.iter().find(|c| c.depth == depth))
}

/// Count unclosed braces in `prefix`.
fn brace_depth(prefix: &str) -> usize {
    let mut depth: usize = 0;
    for c in prefix.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// Bind text with no recognizable declaration.
fn wrap_expression(text: &str) -> Normalized {
    if text.starts_with('<') {
        let markup = text.trim_end_matches(';').trim_end();
        return Normalized {
            unit: CanonicalUnit::new(format!("const {RESERVED_ENTRY} = () => ({markup});")),
            entry: EntryKind::Markup,
            original_name: None,
            warnings: vec![NormalizationWarning::MarkupWrapped],
        };
    }

    Normalized {
        unit: CanonicalUnit::new(format!("const {RESERVED_ENTRY} = {text}")),
        entry: EntryKind::Expression,
        original_name: None,
        warnings: vec![NormalizationWarning::FallbackExpression],
    }
}
