//! Component snippet normalizer.
//!
//! Turns an arbitrary snippet that claims to define one UI component into a
//! [`CanonicalUnit`]: imports and export markers removed, the entry binding
//! renamed to [`RESERVED_ENTRY`], and an escaped form ready to be embedded in
//! a template literal.

pub mod escape;
pub mod pattern;
pub mod source;
pub mod traits;

pub use escape::{escape_template_literal, unescape_template_literal};
pub use pattern::{normalize, PatternNormalizer};
pub use source::{SourceError, SourceText};
pub use traits::{
    CanonicalUnit, EntryKind, NormalizationWarning, Normalized, SourceNormalizer, RESERVED_ENTRY,
};
