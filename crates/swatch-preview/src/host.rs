//! In-process execution host.
//!
//! Mirrors what a sandboxed frame does with a preview document: evaluate the
//! unit in a fresh context, mount the result or an error panel, then report
//! the mounted height. An execution receives the unit and nothing else; the
//! host owns the mount point and the only outbound handle is the
//! [`ResizeEmitter`] it is given.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use swatch_normalize::{CanonicalUnit, RESERVED_ENTRY};

use crate::document::{PreviewDocument, MOUNT_ID};
use crate::resize::{ResizeEmitter, ResizeMessage};
use crate::templates::html_escape;

/// Pixel height of one rendered line in the layout estimate.
const LINE_HEIGHT: f64 = 24.0;

/// Vertical padding of the error panel.
const ERROR_PANEL_PADDING: f64 = 32.0;

/// Markup produced by evaluating a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub markup: String,
}

/// Faults raised while evaluating a unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionFault {
    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("{0}")]
    Thrown(String),
}

/// Runtime primitives available to an execution.
pub trait Evaluator: Send + Sync {
    /// Evaluate a unit and resolve its entry to markup.
    fn evaluate(&self, unit: &CanonicalUnit) -> Result<Rendered, ExecutionFault>;
}

/// What a mount point currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountContent {
    Empty,
    Rendered(String),
    /// Error panel with the caught message
    Error(String),
}

/// The element an execution renders into.
#[derive(Debug, Clone)]
pub struct MountPoint {
    id: String,
    content: MountContent,
}

impl MountPoint {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            content: MountContent::Empty,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &MountContent {
        &self.content
    }

    /// Whether the mount point shows an error panel.
    pub fn has_error_panel(&self) -> bool {
        matches!(self.content, MountContent::Error(_))
    }

    /// The mount point's contents as markup.
    pub fn inner_html(&self) -> String {
        match &self.content {
            MountContent::Empty => String::new(),
            MountContent::Rendered(markup) => markup.clone(),
            MountContent::Error(message) => format!(
                r#"<div class="preview-error" data-preview-error="">Error: {}</div>"#,
                html_escape(message)
            ),
        }
    }

    /// Estimated content height in layout pixels.
    pub fn content_height(&self) -> f64 {
        match &self.content {
            MountContent::Empty => 0.0,
            MountContent::Rendered(markup) => line_count(markup) * LINE_HEIGHT,
            MountContent::Error(message) => {
                line_count(message) * LINE_HEIGHT + ERROR_PANEL_PADDING
            }
        }
    }

    fn render(&mut self, markup: String) {
        self.content = MountContent::Rendered(markup);
    }

    fn show_error(&mut self, message: String) {
        self.content = MountContent::Error(message);
    }
}

fn line_count(text: &str) -> f64 {
    let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if lines == 0 && !text.trim().is_empty() {
        1.0
    } else {
        lines as f64
    }
}

/// Runs preview documents, one fresh mount point per execution.
pub struct IsolatedHost<E> {
    evaluator: E,
}

impl<E: Evaluator> IsolatedHost<E> {
    /// Create a host around a set of runtime primitives.
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Execute a document.
    ///
    /// Never fails: faults end up as an error panel in the returned mount
    /// point. The height is reported only after a successful mount.
    pub fn execute(&self, document: &PreviewDocument, emitter: ResizeEmitter) -> MountPoint {
        let mut mount = MountPoint::new(MOUNT_ID);

        match self.evaluator.evaluate(document.unit()) {
            Ok(rendered) => {
                mount.render(rendered.markup);
                match ResizeMessage::new(mount.content_height()) {
                    Ok(msg) => emitter.emit(msg),
                    Err(e) => tracing::warn!("Skipping resize report: {}", e),
                }
            }
            Err(fault) => {
                tracing::debug!("Preview execution failed: {}", fault);
                mount.show_error(fault.to_string());
            }
        }

        mount
    }
}

/// Best-effort evaluator that resolves the entry to its literal markup.
///
/// It does not run code. It finds the entry declaration, takes the first
/// element it returns, and reports identifiers and components the unit never
/// declares as reference errors.
#[derive(Debug, Default)]
pub struct StaticEvaluator;

impl StaticEvaluator {
    pub fn new() -> Self {
        Self
    }
}

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:function\s+{name}\s*(?:<[^>(]*>)?\s*\(|const\s+{name}\b[^=]*=)",
        name = RESERVED_ENTRY
    ))
    .expect("Invalid entry regex")
});

static THROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: throw new Error('message')
    Regex::new(r#"\bthrow\s+new\s+(\w+)\(\s*['"`]([^'"`]*)['"`]"#).expect("Invalid throw regex")
});

static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Leading identifier of a `{expr}` container, skipping `{{ object }}`
    Regex::new(r"(?:^|[^{])\{\s*([A-Za-z_$][\w$]*)").expect("Invalid expression regex")
});

static COMPONENT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Z][\w]*)").expect("Invalid component tag regex"));

/// Globals every execution context provides.
const GLOBALS: &[&str] = &[
    "React", "ReactDOM", "Fragment", "Math", "JSON", "Date", "String", "Number", "Boolean",
    "Array", "Object", "Promise", "console", "window", "document", "true", "false", "null",
    "undefined", "NaN", "Infinity",
];

impl Evaluator for StaticEvaluator {
    fn evaluate(&self, unit: &CanonicalUnit) -> Result<Rendered, ExecutionFault> {
        let source = unit.as_str();

        let entry = ENTRY_RE
            .find(source)
            .ok_or_else(|| ExecutionFault::Reference(RESERVED_ENTRY.to_string()))?;
        let body = &source[entry.end()..];

        let start = find_tag_start(body, 0);

        // A throw reached before any markup is returned aborts the render
        if let Some(cap) = THROW_RE.captures(body) {
            let at = cap.get(0).map_or(0, |m| m.start());
            if start.map_or(true, |s| at < s) {
                return Err(ExecutionFault::Thrown(format!("{}: {}", &cap[1], &cap[2])));
            }
        }

        let Some(start) = start else {
            return Ok(Rendered {
                markup: String::new(),
            });
        };

        let end = find_element_end(body, start)
            .ok_or_else(|| ExecutionFault::Syntax("Unterminated JSX element".to_string()))?;
        let markup = &body[start..end];

        check_references(source, markup)?;

        Ok(Rendered {
            markup: markup.to_string(),
        })
    }
}

/// Find the next `<` that opens a tag (`<div`, `</div`, `<>`).
fn find_tag_start(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while let Some(offset) = text[pos..].find('<') {
        let at = pos + offset;
        match bytes.get(at + 1) {
            Some(c) if c.is_ascii_alphabetic() || *c == b'/' || *c == b'>' => return Some(at),
            _ => pos = at + 1,
        }
    }
    None
}

/// Find the `>` closing the tag that starts at `start`, skipping `{...}`
/// attribute expressions and quoted values.
fn find_tag_close(text: &str, start: usize) -> Option<usize> {
    let mut braces = 0usize;
    let mut quote: Option<char> = None;

    for (offset, c) in text[start + 1..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if braces == 0 => quote = Some(c),
            (None, '{') => braces += 1,
            (None, '}') => braces = braces.saturating_sub(1),
            (None, '>') if braces == 0 => return Some(start + 1 + offset),
            _ => {}
        }
    }
    None
}

/// Find the end (exclusive) of the element that starts at `start`,
/// handling nested elements, fragments and self-closing tags.
fn find_element_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = start;

    while let Some(tag_start) = find_tag_start(text, pos) {
        let tag_end = find_tag_close(text, tag_start)?;
        let tag = &text[tag_start..=tag_end];

        if tag.starts_with("</") {
            depth = depth.checked_sub(1)?;
        } else if !tag.ends_with("/>") {
            depth += 1;
        }

        if depth == 0 {
            return Some(tag_end + 1);
        }
        pos = tag_end + 1;
    }

    None
}

/// Report identifiers the markup uses but the unit never declares.
fn check_references(source: &str, markup: &str) -> Result<(), ExecutionFault> {
    let mut names: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();

    for cap in EXPRESSION_RE.captures_iter(markup) {
        if let Some(m) = cap.get(1) {
            if seen.insert(m.as_str()) {
                names.push(m.as_str());
            }
        }
    }
    for cap in COMPONENT_TAG_RE.captures_iter(markup) {
        if let Some(m) = cap.get(1) {
            if seen.insert(m.as_str()) {
                names.push(m.as_str());
            }
        }
    }

    for name in names {
        if GLOBALS.contains(&name) || is_declared(source, name) {
            continue;
        }
        return Err(ExecutionFault::Reference(name.to_string()));
    }

    Ok(())
}

/// Whether `name` is bound by a declaration, parameter or destructuring.
fn is_declared(source: &str, name: &str) -> bool {
    let name = regex::escape(name);
    let patterns = [
        format!(r"\b(?:const|let|var|function|class)\s+{name}\b"),
        format!(r"[\[{{,(]\s*{name}\s*[,}}\])=:]"),
        format!(r"\b{name}\s*=>"),
    ];

    patterns.iter().any(|p| {
        Regex::new(p)
            .map(|re| re.is_match(source))
            .unwrap_or(false)
    })
}
