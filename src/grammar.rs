use crate::compiler::{CompileError, GrammarGenerator, ReferenceResolver, META_GRAMMAR};
use crate::runtime::{MatcherId, MatcherSet, Node, SyntaxError};
use tracing::debug;

/// An executable grammar, compiled from PEG source
///
/// The first rule of the source names the grammar and is its entry point;
/// [`parse`](Grammar::parse) starts there and must consume the whole input.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    set: MatcherSet,
    entry: MatcherId,
}

impl Grammar {
    /// Compile PEG source into an executable grammar
    pub fn new(source: &str) -> Result<Self, CompileError> {
        let tree = META_GRAMMAR.parse(source).map_err(CompileError::Grammar)?;

        let mut set = MatcherSet::new();
        let rules = GrammarGenerator::new(&mut set).generate(&tree)?;

        let name = set
            .matcher(rules[0])
            .name()
            .expect("definitions are always named")
            .to_owned();

        let entry = ReferenceResolver::new(&mut set, &rules).resolve()?;

        debug!(grammar = %name, rules = rules.len(), "compiled grammar");

        Ok(Self { name, set, entry })
    }

    /// Get the grammar's name, taken from its first rule
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Match an input in full, producing its node tree
    pub fn parse<'a>(&'a self, input: &'a str) -> Result<Node<'a>, SyntaxError> {
        self.set.parse(self.entry, input)
    }
}
