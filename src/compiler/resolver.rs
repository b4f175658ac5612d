use super::errors::CompileError;
use crate::runtime::{MatcherId, MatcherKind, MatcherSet};
use std::collections::HashMap;
use tracing::trace;

/// Replaces every [`MatcherKind::Reference`] reachable from the entry rule
/// with the matcher it names
///
/// The rewritten graph may be cyclic (recursive rules). Each matcher's
/// children are detached while they are being rewritten, so a cycle coming
/// back through an in-progress matcher finds it childless and stops; the
/// in-progress rewrite reattaches the real children afterwards.
pub struct ReferenceResolver<'s> {
    set: &'s mut MatcherSet,
    registry: HashMap<String, MatcherId>,
    entry: MatcherId,
}

impl<'s> ReferenceResolver<'s> {
    /// Register the named top-level matchers, in order; the first one is the
    /// entry rule
    pub fn new(set: &'s mut MatcherSet, rules: &[MatcherId]) -> Self {
        let mut registry = HashMap::new();

        for &id in rules {
            if let Some(name) = set.matcher(id).name() {
                registry.insert(name.to_owned(), id);
            }
        }

        Self {
            set,
            registry,
            entry: rules[0],
        }
    }

    /// Rewrite the graph and return the resolved entry matcher
    ///
    /// Fails when a reference names a rule that was never registered. After
    /// a successful resolution no reference remains reachable from the
    /// returned matcher.
    pub fn resolve(mut self) -> Result<MatcherId, CompileError> {
        let entry = self.entry;
        self.resolve_matcher(entry)
    }

    fn resolve_matcher(&mut self, id: MatcherId) -> Result<MatcherId, CompileError> {
        let target = match self.set.matcher(id).kind() {
            MatcherKind::Reference(name) => Some(name.clone()),
            _ => None,
        };

        // A reference resolves to whatever the rule it names resolves to
        if let Some(name) = target {
            trace!(rule = %name, "resolving rule reference");

            let target_id = *self
                .registry
                .get(&name)
                .ok_or_else(|| CompileError::UnknownRule(name.clone()))?;

            return self.resolve_matcher(target_id);
        }

        // Detach the children for the duration of their own rewrite; this is
        // what terminates cycles.
        let children = self.set.take_children(id);
        let mut resolved = Vec::with_capacity(children.len());

        for child in children {
            resolved.push(self.resolve_matcher(child)?);
        }

        self.set.put_children(id, resolved);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // Walk the graph from the entry, collecting every reachable matcher.
    fn reachable(set: &MatcherSet, entry: MatcherId) -> Vec<MatcherId> {
        let mut seen = HashSet::new();
        let mut queue = vec![entry];

        while let Some(id) = queue.pop() {
            if seen.insert(id) {
                queue.extend(set.matcher(id).children());
            }
        }

        seen.into_iter().collect()
    }

    // r <- "a" ("," r)?
    fn recursive_rule(set: &mut MatcherSet) -> MatcherId {
        let a = set.literal("a");
        let comma = set.literal(",");
        let call = set.reference("r");
        let pair = set.sequence(vec![comma, call]);
        let tail = set.optional(pair);
        let rule = set.sequence(vec![a, tail]);
        set.set_name(rule, "r");
        rule
    }

    #[test]
    fn an_unknown_rule_is_an_error() {
        let mut set = MatcherSet::new();
        let missing = set.reference("missing");
        let rule = set.sequence(vec![missing]);
        set.set_name(rule, "r");

        let err = ReferenceResolver::new(&mut set, &[rule])
            .resolve()
            .unwrap_err();
        assert_eq!(err, CompileError::UnknownRule("missing".to_owned()));
    }

    #[test]
    fn a_self_recursive_rule_resolves_and_matches() {
        let mut set = MatcherSet::new();
        let rule = recursive_rule(&mut set);

        let entry = ReferenceResolver::new(&mut set, &[rule]).resolve().unwrap();

        assert!(set.parse(entry, "a,a,a").is_ok());
        assert!(set.parse(entry, "a,").is_err());
    }

    #[test]
    fn no_reference_remains_reachable() {
        let mut set = MatcherSet::new();
        let rule = recursive_rule(&mut set);

        let entry = ReferenceResolver::new(&mut set, &[rule]).resolve().unwrap();

        for id in reachable(&set, entry) {
            assert!(
                !matches!(set.matcher(id).kind(), MatcherKind::Reference(_)),
                "matcher {:?} is still a reference",
                id
            );
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut set = MatcherSet::new();
        let rule = recursive_rule(&mut set);

        let entry = ReferenceResolver::new(&mut set, &[rule]).resolve().unwrap();
        let resolved = set.clone();

        let again = ReferenceResolver::new(&mut set, &[rule]).resolve().unwrap();

        assert_eq!(entry, again);
        assert_eq!(set, resolved);
    }

    #[test]
    fn an_entry_reference_resolves_to_its_target() {
        let mut set = MatcherSet::new();
        let alias = set.reference("word");
        set.set_name(alias, "main");
        let word = set.literal("x");
        set.set_name(word, "word");

        let entry = ReferenceResolver::new(&mut set, &[alias, word])
            .resolve()
            .unwrap();

        assert_eq!(entry, word);
    }
}
