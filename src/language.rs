use crate::compiler::{CompileError, GrammarGenerator, ReferenceResolver, META_GRAMMAR};
use crate::runtime::{MatcherId, MatcherSet, Node, SyntaxError};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// Semantic action attached to a rule
pub enum Action<T> {
    /// Receive the rule's raw node; children are not evaluated
    Raw(Box<dyn Fn(&Node) -> T>),

    /// Receive the rule's node along with its children's values, evaluated
    /// bottom-up in source order
    Folded(Box<dyn Fn(&Node, Vec<T>) -> T>),

    /// Collect the children's values into a list (the default)
    Collect,
}

impl<T> Action<T> {
    /// Shorthand for [`Action::Raw`]
    pub fn raw(callback: impl Fn(&Node) -> T + 'static) -> Self {
        Self::Raw(Box::new(callback))
    }

    /// Shorthand for [`Action::Folded`]
    pub fn folded(callback: impl Fn(&Node, Vec<T>) -> T + 'static) -> Self {
        Self::Folded(Box::new(callback))
    }
}

/// A set of rules bound to semantic actions
///
/// Rules are registered in order and the first one is the root the input is
/// parsed with. References are resolved across all registrations the first
/// time an input is evaluated, so a rule may freely call rules registered
/// after it. The resolved graph is cached until the next registration;
/// concurrent [`eval`](Language::eval) calls share it.
///
/// `T` is the caller's value type. Nodes without an action (or with
/// [`Action::Collect`]) evaluate to the list of their children's values,
/// which is why evaluation requires `T: From<Vec<T>>`.
pub struct Language<T> {
    set: MatcherSet,
    rules: Vec<(String, MatcherId)>,
    actions: HashMap<String, Action<T>>,
    compiled: OnceLock<Result<CompiledRules, CompileError>>,
}

#[derive(Debug, Clone)]
struct CompiledRules {
    set: MatcherSet,
    entry: MatcherId,
}

impl<T> Language<T> {
    /// Create a language with no rules
    pub fn new() -> Self {
        Self {
            set: MatcherSet::new(),
            rules: Vec::new(),
            actions: HashMap::new(),
            compiled: OnceLock::new(),
        }
    }

    /// Register the definitions of a source fragment (`name <- …`)
    ///
    /// The action is bound to the fragment's first definition.
    pub fn rule(&mut self, source: &str, action: Action<T>) -> Result<(), CompileError> {
        let tree = META_GRAMMAR.parse(source).map_err(CompileError::Grammar)?;
        let ids = GrammarGenerator::new(&mut self.set).generate(&tree)?;

        let mut action = Some(action);

        for &id in &ids {
            let name = self
                .set
                .matcher(id)
                .name()
                .expect("definitions are always named")
                .to_owned();

            if let Some(action) = action.take() {
                self.actions.insert(name.clone(), action);
            }

            self.rules.push((name, id));
        }

        self.compiled = OnceLock::new();

        Ok(())
    }

    /// Register a hand-built matcher under the given name
    pub fn rule_matcher(
        &mut self,
        name: &str,
        build: impl FnOnce(&mut MatcherSet) -> MatcherId,
        action: Action<T>,
    ) {
        let id = build(&mut self.set);
        self.set.set_name(id, name);

        self.rules.push((name.to_owned(), id));
        self.actions.insert(name.to_owned(), action);

        self.compiled = OnceLock::new();
    }

    // Resolve the registry into an executable graph, reusing a cached one
    // when no rule was registered since.
    fn compiled(&self) -> Result<&CompiledRules, LanguageError> {
        if self.rules.is_empty() {
            return Err(LanguageError::NoRules);
        }

        let compiled = self.compiled.get_or_init(|| {
            let mut set = self.set.clone();
            let ids: Vec<MatcherId> = self.rules.iter().map(|(_, id)| *id).collect();
            let entry = ReferenceResolver::new(&mut set, &ids).resolve()?;

            debug!(root = %self.rules[0].0, rules = ids.len(), "compiled rule registry");

            Ok(CompiledRules { set, entry })
        });

        compiled
            .as_ref()
            .map_err(|err| LanguageError::Compile(err.clone()))
    }

    /// Parse the input with the root rule and fold the tree into a value
    pub fn eval(&self, input: &str) -> Result<T, LanguageError>
    where
        T: From<Vec<T>>,
    {
        let compiled = self.compiled()?;
        let node = compiled.set.parse(compiled.entry, input)?;

        Ok(self.fold(&node))
    }

    /// Fold an already-parsed node tree into a value
    pub fn eval_node(&self, node: &Node) -> Result<T, LanguageError>
    where
        T: From<Vec<T>>,
    {
        if self.rules.is_empty() {
            return Err(LanguageError::NoRules);
        }

        Ok(self.fold(node))
    }

    fn fold(&self, node: &Node) -> T
    where
        T: From<Vec<T>>,
    {
        match node.name().and_then(|name| self.actions.get(name)) {
            Some(Action::Raw(callback)) => callback(node),

            Some(Action::Folded(callback)) => {
                let values = node.children().iter().map(|child| self.fold(child)).collect();
                callback(node, values)
            }

            Some(Action::Collect) | None => {
                let values: Vec<T> = node.children().iter().map(|child| self.fold(child)).collect();
                T::from(values)
            }
        }
    }
}

impl<T> Default for Language<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Error raised when registering or evaluating rules
#[derive(Debug)]
pub enum LanguageError {
    /// A registered fragment or rule reference is invalid
    Compile(CompileError),

    /// The input does not match the root rule
    Syntax(SyntaxError),

    /// Evaluation was attempted before any rule was registered
    NoRules,
}

impl fmt::Display for LanguageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Compile(err) => write!(f, "{}", err),
            Self::Syntax(err) => write!(f, "{}", err),
            Self::NoRules => write!(f, "No rule was registered before evaluating"),
        }
    }
}

impl From<CompileError> for LanguageError {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

impl From<SyntaxError> for LanguageError {
    fn from(err: SyntaxError) -> Self {
        Self::Syntax(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Value {
        Num(i64),
        List(Vec<Value>),
    }

    impl From<Vec<Value>> for Value {
        fn from(values: Vec<Value>) -> Self {
            Value::List(values)
        }
    }

    fn sum(value: &Value) -> i64 {
        match value {
            Value::Num(n) => *n,
            Value::List(values) => values.iter().map(sum).sum(),
        }
    }

    #[test]
    fn folded_actions_receive_child_values() {
        let mut language = Language::new();

        language
            .rule(
                "expr <- num ('+' num)*",
                Action::folded(|_, values| Value::Num(values.iter().map(sum).sum())),
            )
            .unwrap();
        language
            .rule(
                "num <- [0-9]+",
                Action::folded(|node, _| Value::Num(node.text().parse().unwrap())),
            )
            .unwrap();

        assert_eq!(language.eval("1+2+3").unwrap(), Value::Num(6));
        assert_eq!(language.eval("40").unwrap(), Value::Num(40));
    }

    #[test]
    fn raw_actions_receive_the_unevaluated_node() {
        let mut language = Language::new();

        language
            .rule(
                "pair <- [a-z] [a-z]",
                Action::raw(|node| Value::Num(node.children().len() as i64)),
            )
            .unwrap();

        assert_eq!(language.eval("ab").unwrap(), Value::Num(2));
    }

    #[test]
    fn the_default_action_collects_child_values() {
        let mut language = Language::new();

        language.rule("pair <- digit digit", Action::Collect).unwrap();
        language
            .rule(
                "digit <- [0-9]",
                Action::folded(|node, _| Value::Num(node.text().parse().unwrap())),
            )
            .unwrap();

        assert_eq!(
            language.eval("42").unwrap(),
            Value::List(vec![Value::Num(4), Value::Num(2)])
        );
    }

    #[test]
    fn hand_built_matchers_can_be_registered() {
        let mut language = Language::new();

        language.rule_matcher(
            "word",
            |set| set.regex("[a-z]+").unwrap(),
            Action::raw(|node| Value::Num(node.text().len() as i64)),
        );

        assert_eq!(language.eval("hello").unwrap(), Value::Num(5));
    }

    #[test]
    fn node_trees_can_be_evaluated_directly() {
        let grammar = crate::grammar::Grammar::new("num <- [0-9]+").unwrap();
        let node = grammar.parse("42").unwrap();

        let mut language = Language::new();
        language
            .rule(
                "num <- [0-9]+",
                Action::folded(|node, _| Value::Num(node.text().parse().unwrap())),
            )
            .unwrap();

        assert_eq!(language.eval_node(&node).unwrap(), Value::Num(42));
    }

    #[test]
    fn evaluating_without_rules_is_an_error() {
        let language: Language<Value> = Language::new();

        assert!(matches!(language.eval("x"), Err(LanguageError::NoRules)));
    }

    #[test]
    fn an_unresolved_reference_is_reported() {
        let mut language: Language<Value> = Language::new();
        language.rule("a <- b", Action::Collect).unwrap();

        match language.eval("x") {
            Err(LanguageError::Compile(CompileError::UnknownRule(name))) => {
                assert_eq!(name, "b");
            }
            other => panic!("expected an unknown rule error, got {:?}", other),
        }
    }

    #[test]
    fn syntax_failures_carry_a_preview() {
        let mut language: Language<Value> = Language::new();
        language.rule("word <- [a-z]+", Action::Collect).unwrap();

        match language.eval("abc42") {
            Err(LanguageError::Syntax(err)) => {
                assert_eq!(err.offset(), 3);
                assert_eq!(err.preview(), "42");
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}
