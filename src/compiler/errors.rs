use crate::runtime::SyntaxError;
use std::fmt;

/// Error raised while turning grammar source into an executable matcher graph
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The grammar source itself is malformed
    Grammar(SyntaxError),

    /// A rule is referenced but never defined
    UnknownRule(String),

    /// A string literal contains an unsupported escape sequence
    UnknownEscape(char),

    /// A string literal ends in the middle of an escape sequence
    UnterminatedEscape,

    /// A character class was rejected by the regex engine
    InvalidClass { class: String, message: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Grammar(err) => write!(f, "Failed to parse grammar: {}", err),
            Self::UnknownRule(name) => write!(f, "Rule [{}] was not found", name),
            Self::UnknownEscape(c) => write!(f, "Unknown escape sequence '\\{}'", c),
            Self::UnterminatedEscape => {
                write!(f, "Unterminated escape sequence in string literal")
            }
            Self::InvalidClass { class, message } => {
                write!(f, "Invalid character class {}: {}", class, message)
            }
        }
    }
}
