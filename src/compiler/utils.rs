use super::errors::CompileError;

/// Decode the backslash escapes of a quoted literal's content
///
/// Recognizes `\n`, `\r`, `\t`, `\\` and the quote character the literal was
/// written with; anything else is a grammar error.
pub fn unescape_literal(raw: &str, quote: char) -> Result<String, CompileError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(c) if c == quote => out.push(c),
            Some(c) => return Err(CompileError::UnknownEscape(c)),
            None => return Err(CompileError::UnterminatedEscape),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(unescape_literal("abc", '"').unwrap(), "abc");
        assert_eq!(unescape_literal("", '"').unwrap(), "");
    }

    #[test]
    fn standard_escapes_are_decoded() {
        assert_eq!(unescape_literal("a\\tb\\n", '"').unwrap(), "a\tb\n");
        assert_eq!(unescape_literal("\\r\\\\", '"').unwrap(), "\r\\");
    }

    #[test]
    fn the_matching_quote_can_be_escaped() {
        assert_eq!(unescape_literal("\\'", '\'').unwrap(), "'");

        // The other quote kind is not a valid escape
        assert_eq!(
            unescape_literal("\\'", '"'),
            Err(CompileError::UnknownEscape('\''))
        );
    }

    #[test]
    fn unknown_and_dangling_escapes_are_rejected() {
        assert_eq!(
            unescape_literal("\\q", '"'),
            Err(CompileError::UnknownEscape('q'))
        );
        assert_eq!(
            unescape_literal("abc\\", '"'),
            Err(CompileError::UnterminatedEscape)
        );
    }
}
