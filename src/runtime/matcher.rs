use super::errors::SyntaxError;
use super::node::Node;
use regex::Regex;

/// Stable handle to a matcher stored in a [`MatcherSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatcherId(u32);

impl MatcherId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena owning a graph of matchers
///
/// Matchers refer to their children by [`MatcherId`], so the graph may
/// contain cycles (recursive rules) while remaining immutable and shareable
/// across threads once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatcherSet {
    matchers: Vec<Matcher>,
}

/// A single parsing expression
///
/// The kind decides the matching rule, the children feed it, and the optional
/// name is stamped on every node the matcher produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    kind: MatcherKind,
    name: Option<String>,
    children: Vec<MatcherId>,
}

impl Matcher {
    /// Get the matcher's kind
    pub fn kind(&self) -> &MatcherKind {
        &self.kind
    }

    /// Get the matcher's label, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the matcher's children
    pub fn children(&self) -> &[MatcherId] {
        &self.children
    }

    // Every variant builds its result through here, so the label always ends
    // up on the node.
    fn node<'a>(&'a self, text: &'a str, children: Vec<Node<'a>>) -> Node<'a> {
        Node::new(text, children, self.name.as_deref())
    }
}

/// The closed set of parsing expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum MatcherKind {
    /// Consume this exact string
    Literal(String),

    /// Consume what the pattern matches at the very start of the input
    Regex(AnchoredRegex),

    /// Consume every child in order; fail on the first failing child
    Sequence,

    /// Consume the first child that matches, trying them in order
    Or,

    /// Succeed without consuming anything when the child fails
    Not,

    /// Succeed without consuming anything when the child matches
    And,

    /// Consume the child repeatedly, at least once
    OneOrMore,

    /// Consume the child repeatedly, possibly never
    ZeroOrMore,

    /// Consume the child at most once
    Optional,

    /// Stand-in for another rule, replaced during resolution
    Reference(String),
}

/// A regex compiled to match at the start of its input only, never searching
#[derive(Debug, Clone)]
pub struct AnchoredRegex {
    pattern: String,
    regex: Regex,
}

impl AnchoredRegex {
    fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(r"\A(?:{})", pattern))?;

        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    /// Get the pattern this regex was compiled from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Length of the anchored match, if any
    fn match_len(&self, input: &str) -> Option<usize> {
        self.regex.find(input).map(|found| found.end())
    }
}

impl PartialEq for AnchoredRegex {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl MatcherSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: MatcherKind, children: Vec<MatcherId>) -> MatcherId {
        let id = MatcherId(self.matchers.len() as u32);

        self.matchers.push(Matcher {
            kind,
            name: None,
            children,
        });

        id
    }

    /// Insert a matcher consuming the given constant string
    pub fn literal(&mut self, string: &str) -> MatcherId {
        self.insert(MatcherKind::Literal(string.to_owned()), vec![])
    }

    /// Insert a matcher consuming what the pattern matches at the start of
    /// the remaining input
    pub fn regex(&mut self, pattern: &str) -> Result<MatcherId, regex::Error> {
        let regex = AnchoredRegex::new(pattern)?;
        Ok(self.insert(MatcherKind::Regex(regex), vec![]))
    }

    /// Insert a matcher consuming every child in order
    pub fn sequence(&mut self, children: Vec<MatcherId>) -> MatcherId {
        self.insert(MatcherKind::Sequence, children)
    }

    /// Insert a matcher consuming the first child that matches
    pub fn or(&mut self, children: Vec<MatcherId>) -> MatcherId {
        self.insert(MatcherKind::Or, children)
    }

    /// Insert a negative lookahead on the child
    pub fn not(&mut self, child: MatcherId) -> MatcherId {
        self.insert(MatcherKind::Not, vec![child])
    }

    /// Insert a positive lookahead on the child
    pub fn and(&mut self, child: MatcherId) -> MatcherId {
        self.insert(MatcherKind::And, vec![child])
    }

    /// Insert a repetition of the child requiring at least one match
    pub fn one_or_more(&mut self, child: MatcherId) -> MatcherId {
        self.insert(MatcherKind::OneOrMore, vec![child])
    }

    /// Insert a repetition of the child allowing any number of matches
    pub fn zero_or_more(&mut self, child: MatcherId) -> MatcherId {
        self.insert(MatcherKind::ZeroOrMore, vec![child])
    }

    /// Insert a repetition of the child allowing at most one match
    pub fn optional(&mut self, child: MatcherId) -> MatcherId {
        self.insert(MatcherKind::Optional, vec![child])
    }

    /// Insert a stand-in for the rule with the given name
    pub fn reference(&mut self, target: &str) -> MatcherId {
        self.insert(MatcherKind::Reference(target.to_owned()), vec![])
    }

    /// Label a matcher; every node it produces will carry the name
    pub fn set_name(&mut self, id: MatcherId, name: &str) {
        self.matchers[id.index()].name = Some(name.to_owned());
    }

    /// Get a matcher by its handle
    pub fn matcher(&self, id: MatcherId) -> &Matcher {
        &self.matchers[id.index()]
    }

    /// Detach a matcher's child list (see the reference resolver)
    pub(crate) fn take_children(&mut self, id: MatcherId) -> Vec<MatcherId> {
        std::mem::take(&mut self.matchers[id.index()].children)
    }

    /// Reattach a matcher's child list
    pub(crate) fn put_children(&mut self, id: MatcherId, children: Vec<MatcherId>) {
        self.matchers[id.index()].children = children;
    }

    /// Try to consume a prefix of `input` with the given matcher
    ///
    /// Returns the node for the consumed prefix, or `None` when the matcher
    /// does not apply at this position. Failing to match is not an error:
    /// the caller decides what a dead end means.
    pub fn match_prefix<'a>(&'a self, id: MatcherId, input: &'a str) -> Option<Node<'a>> {
        let matcher = self.matcher(id);

        match &matcher.kind {
            MatcherKind::Literal(string) => {
                if input.starts_with(string.as_str()) {
                    Some(matcher.node(&input[..string.len()], vec![]))
                } else {
                    None
                }
            }

            MatcherKind::Regex(regex) => regex
                .match_len(input)
                .map(|len| matcher.node(&input[..len], vec![])),

            MatcherKind::Sequence => {
                let mut children = Vec::with_capacity(matcher.children.len());
                let mut consumed = 0;

                for &child in &matcher.children {
                    let node = self.match_prefix(child, &input[consumed..])?;

                    consumed += node.text().len();
                    children.push(node);
                }

                Some(matcher.node(&input[..consumed], children))
            }

            MatcherKind::Or => {
                for &child in &matcher.children {
                    if let Some(node) = self.match_prefix(child, input) {
                        let consumed = node.text().len();
                        return Some(matcher.node(&input[..consumed], vec![node]));
                    }
                }

                None
            }

            MatcherKind::Not => match self.match_prefix(matcher.children[0], input) {
                Some(_) => None,
                None => Some(matcher.node(&input[..0], vec![])),
            },

            MatcherKind::And => self
                .match_prefix(matcher.children[0], input)
                .map(|_| matcher.node(&input[..0], vec![])),

            MatcherKind::OneOrMore => self.match_repeat(matcher, input, 1, None),
            MatcherKind::ZeroOrMore => self.match_repeat(matcher, input, 0, None),
            MatcherKind::Optional => self.match_repeat(matcher, input, 0, Some(1)),

            // References are replaced during resolution; an unresolved one
            // matches nothing.
            MatcherKind::Reference(_) => None,
        }
    }

    // Shared repetition loop; `min` and `max` are the inclusive repetition
    // bound of the calling variant.
    fn match_repeat<'a>(
        &'a self,
        matcher: &'a Matcher,
        input: &'a str,
        min: usize,
        max: Option<usize>,
    ) -> Option<Node<'a>> {
        let inner = matcher.children[0];

        let mut children = vec![];
        let mut consumed = 0;

        while max.map_or(true, |max| children.len() < max) {
            let node = match self.match_prefix(inner, &input[consumed..]) {
                Some(node) => node,
                None => break,
            };

            let len = node.text().len();
            consumed += len;
            children.push(node);

            // An empty-width success would repeat forever
            if len == 0 {
                break;
            }
        }

        if children.len() >= min {
            Some(matcher.node(&input[..consumed], children))
        } else {
            None
        }
    }

    /// Match `input` in full
    ///
    /// Fails with a preview of the first unconsumed region when the matcher
    /// does not apply or leaves a remainder.
    pub fn parse<'a>(&'a self, id: MatcherId, input: &'a str) -> Result<Node<'a>, SyntaxError> {
        match self.match_prefix(id, input) {
            Some(node) if node.text().len() == input.len() => Ok(node),
            Some(node) => {
                let consumed = node.text().len();
                Err(SyntaxError::new(consumed, &input[consumed..]))
            }
            None => Err(SyntaxError::new(0, input)),
        }
    }
}
