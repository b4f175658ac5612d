use super::errors::CompileError;
use super::utils::unescape_literal;
use crate::runtime::{MatcherId, MatcherKind, MatcherSet, Node};

/// Folds the node tree of parsed grammar source into the list of its named
/// top-level matchers
///
/// Dispatch is keyed on node names: nodes produced by the notation's rules
/// are mapped to matchers, everything unnamed or unhandled passes through
/// untouched. Cross-rule calls become [`MatcherKind::Reference`] stand-ins
/// for the resolver to eliminate.
pub struct GrammarGenerator<'s> {
    set: &'s mut MatcherSet,
}

/// Intermediate value of the fold
enum Folded<'t, 'n> {
    /// Unhandled node, forwarded as-is
    Tree(&'n Node<'t>),

    /// A finished matcher
    Matcher(MatcherId),

    /// Raw source text (an identifier spelling, an operator glyph)
    Text(&'t str),

    /// Values collected by a repetition
    List(Vec<Folded<'t, 'n>>),
}

impl<'t, 'n> Folded<'t, 'n> {
    fn matcher(&self) -> MatcherId {
        match self {
            Self::Matcher(id) => *id,
            _ => unreachable!("expected a folded matcher"),
        }
    }

    fn text(&self) -> &'t str {
        match *self {
            Self::Text(text) => text,
            _ => unreachable!("expected folded source text"),
        }
    }

    fn items(&self) -> &[Folded<'t, 'n>] {
        match self {
            Self::List(items) => items,
            _ => unreachable!("expected a folded list"),
        }
    }
}

impl<'s> GrammarGenerator<'s> {
    /// Create a generator inserting into the given set
    pub fn new(set: &'s mut MatcherSet) -> Self {
        Self { set }
    }

    /// Fold a `grammar` node tree into its definitions, in source order
    pub fn generate(&mut self, tree: &Node) -> Result<Vec<MatcherId>, CompileError> {
        match self.fold(tree)? {
            Folded::List(defs) => Ok(defs.iter().map(Folded::matcher).collect()),
            _ => unreachable!("a grammar folds to its definition list"),
        }
    }

    fn fold<'t, 'n>(&mut self, node: &'n Node<'t>) -> Result<Folded<'t, 'n>, CompileError> {
        let mut children = Vec::with_capacity(node.children().len());

        for child in node.children() {
            children.push(self.fold(child)?);
        }

        let name = match node.name() {
            Some(name) => name,
            None => return Ok(Folded::Tree(node)),
        };

        Ok(match name {
            // The identifier's raw spelling
            "identifier__regex" => Folded::Text(node.text()),

            // An identifier in expression position calls another rule
            "identifier" => {
                let target = children[0].text();
                Folded::Matcher(self.set.reference(target))
            }

            // '…' or "…", with standard escapes decoded
            "literal" => {
                let quoted = node.children()[0].text();
                let quote = quoted.chars().next().unwrap();
                let content = unescape_literal(&quoted[1..quoted.len() - 1], quote)?;
                Folded::Matcher(self.set.literal(&content))
            }

            // […], forwarded to the regex engine as written
            "class" => {
                let class = node.children()[0].text();
                let id = self.set.regex(class).map_err(|err| CompileError::InvalidClass {
                    class: class.to_owned(),
                    message: err.to_string(),
                })?;
                Folded::Matcher(id)
            }

            // Any single character
            "dot" => Folded::Matcher(self.set.regex(".").unwrap()),

            // The definition's body, labeled with the defined name
            "definition" => {
                let name = match self.set.matcher(children[0].matcher()).kind() {
                    MatcherKind::Reference(name) => name.clone(),
                    _ => unreachable!("a definition starts with its identifier"),
                };

                let body = children[2].matcher();
                self.set.set_name(body, &name);
                Folded::Matcher(body)
            }

            // Alternatives collapse into an ordered choice
            "expression" => {
                let first = children[0].matcher();
                let rest = children[1].items();

                if rest.is_empty() {
                    Folded::Matcher(first)
                } else {
                    let mut branches = vec![first];
                    branches.extend(rest.iter().map(Folded::matcher));
                    Folded::Matcher(self.set.or(branches))
                }
            }

            "expression__zeroormore" | "grammar__oneormore" => Folded::List(children),

            // Drop the slash, keep the alternative
            "expression__sequence" => children.swap_remove(1),

            // Drop the lookahead guard, keep the identifier
            "primary__sequence" => children.swap_remove(0),

            // Drop the parentheses, keep the inner expression
            "primary__parens" => children.swap_remove(1),

            "primary" => children.swap_remove(0),

            // The quantifier or lookahead glyph, if present
            "prefix__optional" | "suffix__optional" => Folded::Text(node.text().trim()),

            "prefix" => {
                let suffix = children[1].matcher();

                match children[0].text().chars().next() {
                    Some('&') => Folded::Matcher(self.set.and(suffix)),
                    Some('!') => Folded::Matcher(self.set.not(suffix)),
                    _ => Folded::Matcher(suffix),
                }
            }

            "suffix" => {
                let primary = children[0].matcher();

                match children[1].text().chars().next() {
                    Some('?') => Folded::Matcher(self.set.optional(primary)),
                    Some('*') => Folded::Matcher(self.set.zero_or_more(primary)),
                    Some('+') => Folded::Matcher(self.set.one_or_more(primary)),
                    _ => Folded::Matcher(primary),
                }
            }

            "sequence" => {
                if children.len() == 1 {
                    children.swap_remove(0)
                } else {
                    let items = children.iter().map(Folded::matcher).collect();
                    Folded::Matcher(self.set.sequence(items))
                }
            }

            // The list of definitions is the final product
            "grammar" => children.swap_remove(1),

            _ => Folded::Tree(node),
        })
    }
}
