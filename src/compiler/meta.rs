use super::resolver::ReferenceResolver;
use crate::runtime::{MatcherId, MatcherSet, Node, SyntaxError};
use lazy_static::lazy_static;

lazy_static! {
    /// The grammar used to read grammars, built once per process
    pub static ref META_GRAMMAR: MetaGrammar = MetaGrammar::build();
}

/// Hand-constructed grammar for the PEG notation itself
///
/// Parsing grammar source with it produces a node tree with a fixed set of
/// rule names; the [generator](super::GrammarGenerator) dispatches on those
/// names to assemble the user's matcher graph.
pub struct MetaGrammar {
    set: MatcherSet,
    entry: MatcherId,
}

// Token rules all share the shape `name <- 'glyph' spacing`.
fn token(set: &mut MatcherSet, name: &str, glyph: &str) -> MatcherId {
    let glyph = set.literal(glyph);
    let spacing = set.reference("spacing");
    let id = set.sequence(vec![glyph, spacing]);
    set.set_name(id, name);
    id
}

impl MetaGrammar {
    /// Assemble and resolve the matcher graph for the notation:
    ///
    /// ```text
    /// grammar     <- spacing definition+
    /// definition  <- identifier left_arrow expression
    /// expression  <- sequence (slash sequence)*
    /// sequence    <- prefix*
    /// prefix      <- (and / not)? suffix
    /// suffix      <- primary (question / star / plus)?
    /// primary     <- identifier !left_arrow
    ///              / open expression close
    ///              / literal / class / dot
    /// identifier  <- [A-Za-z0-9_]+ spacing
    /// literal     <- ('…' / "…") spacing
    /// class       <- '[…]' spacing
    /// dot         <- '.' spacing
    /// and         <- '&' spacing           not        <- '!' spacing
    /// slash       <- '/' spacing           left_arrow <- '<-' spacing
    /// question    <- '?' spacing           star       <- '*' spacing
    /// plus        <- '+' spacing           open       <- '(' spacing
    /// close       <- ')' spacing
    /// spacing     <- (space / comment)*
    /// comment     <- '#' (!end_of_line .)* end_of_line
    /// space       <- ' ' / '\t' / end_of_line
    /// end_of_line <- '\r\n' / '\n' / '\r'
    /// ```
    ///
    /// Literal and class terminals are the non-greedy regexes `'.*?'`,
    /// `".*?"` and `\[.*?\]`, so escaped quotes or brackets inside them are
    /// not supported.
    ///
    /// Compound sub-expressions carry synthetic names
    /// (`primary__sequence`, `expression__zeroormore`, …) for the generator
    /// to dispatch on.
    fn build() -> Self {
        let mut set = MatcherSet::new();

        // end_of_line <- '\r\n' / '\n' / '\r'
        let end_of_line = {
            let crlf = set.literal("\r\n");
            let lf = set.literal("\n");
            let cr = set.literal("\r");
            let id = set.or(vec![crlf, lf, cr]);
            set.set_name(id, "end_of_line");
            id
        };

        // space <- ' ' / '\t' / end_of_line
        let space = {
            let blank = set.literal(" ");
            let tab = set.literal("\t");
            let eol = set.reference("end_of_line");
            let id = set.or(vec![blank, tab, eol]);
            set.set_name(id, "space");
            id
        };

        // comment <- '#' (!end_of_line .)* end_of_line
        let comment = {
            let hash = set.literal("#");
            let eol = set.reference("end_of_line");
            let not_eol = set.not(eol);
            let any = set.regex(".").unwrap();
            let body_char = set.sequence(vec![not_eol, any]);
            let body = set.zero_or_more(body_char);
            let eol = set.reference("end_of_line");
            let id = set.sequence(vec![hash, body, eol]);
            set.set_name(id, "comment");
            id
        };

        // spacing <- (space / comment)*
        let spacing = {
            let space = set.reference("space");
            let comment = set.reference("comment");
            let either = set.or(vec![space, comment]);
            let id = set.zero_or_more(either);
            set.set_name(id, "spacing");
            id
        };

        let and_op = token(&mut set, "and", "&");
        let not_op = token(&mut set, "not", "!");
        let slash = token(&mut set, "slash", "/");
        let left_arrow = token(&mut set, "left_arrow", "<-");
        let question = token(&mut set, "question", "?");
        let star = token(&mut set, "star", "*");
        let plus = token(&mut set, "plus", "+");
        let open = token(&mut set, "open", "(");
        let close = token(&mut set, "close", ")");
        let dot = token(&mut set, "dot", ".");

        // identifier <- [A-Za-z0-9_]+ spacing
        let identifier = {
            let word = set.regex("[A-Za-z0-9_]+").unwrap();
            set.set_name(word, "identifier__regex");
            let spacing = set.reference("spacing");
            let id = set.sequence(vec![word, spacing]);
            set.set_name(id, "identifier");
            id
        };

        // literal <- ('…' / "…") spacing
        let literal = {
            let single = set.regex("'.*?'").unwrap();
            let double = set.regex("\".*?\"").unwrap();
            let quoted = set.or(vec![single, double]);
            let spacing = set.reference("spacing");
            let id = set.sequence(vec![quoted, spacing]);
            set.set_name(id, "literal");
            id
        };

        // class <- '[…]' spacing
        let class = {
            let bracketed = set.regex(r"\[.*?\]").unwrap();
            let spacing = set.reference("spacing");
            let id = set.sequence(vec![bracketed, spacing]);
            set.set_name(id, "class");
            id
        };

        // primary <- identifier !left_arrow / open expression close
        //          / literal / class / dot
        let primary = {
            let ident = set.reference("identifier");
            let arrow = set.reference("left_arrow");
            let no_arrow = set.not(arrow);
            let call = set.sequence(vec![ident, no_arrow]);
            set.set_name(call, "primary__sequence");

            let open = set.reference("open");
            let expr = set.reference("expression");
            let close = set.reference("close");
            let parens = set.sequence(vec![open, expr, close]);
            set.set_name(parens, "primary__parens");

            let literal = set.reference("literal");
            let class = set.reference("class");
            let dot = set.reference("dot");

            let id = set.or(vec![call, parens, literal, class, dot]);
            set.set_name(id, "primary");
            id
        };

        // suffix <- primary (question / star / plus)?
        let suffix = {
            let primary = set.reference("primary");
            let question = set.reference("question");
            let star = set.reference("star");
            let plus = set.reference("plus");
            let glyph = set.or(vec![question, star, plus]);
            let quantifier = set.optional(glyph);
            set.set_name(quantifier, "suffix__optional");
            let id = set.sequence(vec![primary, quantifier]);
            set.set_name(id, "suffix");
            id
        };

        // prefix <- (and / not)? suffix
        let prefix = {
            let and_op = set.reference("and");
            let not_op = set.reference("not");
            let glyph = set.or(vec![and_op, not_op]);
            let lookahead = set.optional(glyph);
            set.set_name(lookahead, "prefix__optional");
            let suffix = set.reference("suffix");
            let id = set.sequence(vec![lookahead, suffix]);
            set.set_name(id, "prefix");
            id
        };

        // sequence <- prefix*
        let sequence = {
            let prefix = set.reference("prefix");
            let id = set.zero_or_more(prefix);
            set.set_name(id, "sequence");
            id
        };

        // expression <- sequence (slash sequence)*
        let expression = {
            let first = set.reference("sequence");
            let slash = set.reference("slash");
            let next = set.reference("sequence");
            let tail = set.sequence(vec![slash, next]);
            set.set_name(tail, "expression__sequence");
            let rest = set.zero_or_more(tail);
            set.set_name(rest, "expression__zeroormore");
            let id = set.sequence(vec![first, rest]);
            set.set_name(id, "expression");
            id
        };

        // definition <- identifier left_arrow expression
        let definition = {
            let ident = set.reference("identifier");
            let arrow = set.reference("left_arrow");
            let expr = set.reference("expression");
            let id = set.sequence(vec![ident, arrow, expr]);
            set.set_name(id, "definition");
            id
        };

        // grammar <- spacing definition+
        let grammar = {
            let spacing = set.reference("spacing");
            let def = set.reference("definition");
            let defs = set.one_or_more(def);
            set.set_name(defs, "grammar__oneormore");
            let id = set.sequence(vec![spacing, defs]);
            set.set_name(id, "grammar");
            id
        };

        let rules = vec![
            grammar, definition, expression, sequence, prefix, suffix, primary, identifier,
            literal, class, dot, and_op, not_op, slash, left_arrow, question, star, plus, open,
            close, spacing, comment, space, end_of_line,
        ];

        let entry = ReferenceResolver::new(&mut set, &rules)
            .resolve()
            .expect("the notation only references its own rules");

        Self { set, entry }
    }

    /// Parse PEG source into its node tree
    pub fn parse<'a>(&'a self, source: &'a str) -> Result<Node<'a>, SyntaxError> {
        self.set.parse(self.entry, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_single_definition() {
        let tree = META_GRAMMAR.parse("greeting <- \"hello\"").unwrap();

        assert_eq!(tree.name(), Some("grammar"));

        let defs = &tree.children()[1];
        assert_eq!(defs.name(), Some("grammar__oneormore"));
        assert_eq!(defs.children().len(), 1);
        assert_eq!(defs.children()[0].name(), Some("definition"));
    }

    #[test]
    fn accepts_comments_and_blank_lines() {
        let source = "# a grammar\n\na <- b+ # uses b\nb <- 'x'\n";
        assert!(META_GRAMMAR.parse(source).is_ok());
    }

    #[test]
    fn accepts_crlf_line_endings() {
        assert!(META_GRAMMAR.parse("a <- 'x'\r\nb <- a\r\n").is_ok());
    }

    #[test]
    fn rejects_a_missing_arrow() {
        assert!(META_GRAMMAR.parse("a 'x'").is_err());
    }

    #[test]
    fn rejects_an_unterminated_literal() {
        assert!(META_GRAMMAR.parse("a <- \"x").is_err());
    }
}
