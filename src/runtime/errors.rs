use std::fmt;

/// Number of characters quoted from the unconsumed input when reporting
const PREVIEW_MAX_CHARS: usize = 50;

/// Error raised when an input does not match a grammar
///
/// Carries the byte offset of the first unconsumed position and a short
/// preview of the input from that position on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    offset: usize,
    preview: String,
}

impl SyntaxError {
    /// Create a new error from the unconsumed remainder of the input
    pub(crate) fn new(offset: usize, remaining: &str) -> Self {
        Self {
            offset,
            preview: remaining.chars().take(PREVIEW_MAX_CHARS).collect(),
        }
    }

    /// Byte offset of the first position the grammar could not consume
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Preview of the unconsumed input, truncated to a few dozen characters
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Syntax error at offset {}: unexpected content {:?}",
            self.offset, self.preview
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_truncated() {
        let long = "x".repeat(80);
        let err = SyntaxError::new(0, &long);
        assert_eq!(err.preview().len(), 50);
    }

    #[test]
    fn display_quotes_the_preview() {
        let err = SyntaxError::new(3, "d");
        assert_eq!(
            err.to_string(),
            "Syntax error at offset 3: unexpected content \"d\""
        );
    }
}
