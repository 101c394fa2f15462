//! Validated snippet input.

/// Snippet text that passed input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText(String);

impl SourceText {
    /// Validate caller input. Empty or whitespace-only text is rejected.
    pub fn new(text: impl Into<String>) -> Result<Self, SourceError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SourceText {
    type Error = SourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors raised before a snippet reaches the normalizer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source code is empty")]
    Empty,

    #[error("Field '{0}' is missing or not a string")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_source() {
        assert_eq!(SourceText::new(""), Err(SourceError::Empty));
        assert_eq!(SourceText::new("  \n\t "), Err(SourceError::Empty));
    }

    #[test]
    fn accepts_any_non_blank_text() {
        let source = SourceText::new("<div />").unwrap();
        assert_eq!(source.as_str(), "<div />");
    }
}
