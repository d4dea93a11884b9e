//! The grammar table: a flat, index-addressed description of every rule.
//!
//! A [`Grammar`] is produced once, either through [`GrammarBuilder`] or from a
//! JSON definition via [`parse_grammar`], and is read-only afterwards. The
//! runtime and the tree builder only ever see [`RuleId`] handles and use the
//! lookups defined here.

pub mod builder;
pub mod rules;

use std::collections::HashMap;
use std::fmt;

pub use builder::GrammarBuilder;
pub use rules::{parse_grammar, GrammarDefinition, RuleDefinition, RuleType};

/// Dense handle of a rule inside a [`Grammar`].
///
/// Ids are only meaningful for the grammar that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl RuleId {
    /// Position of the rule in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The identifier a grammar author gives a rule.
///
/// Named rules are stable and appear in the output tree under their name.
/// Synthetic rules are compiler-generated glue (the branches of an
/// alternation, the body of a repetition, ...) and are transitional unless
/// configured otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKey {
    /// A user-declared rule name.
    Name(String),
    /// A generated rule number.
    Synthetic(u32),
}

impl RuleKey {
    /// Reads a key from its textual form: all-digit keys are synthetic.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = text.parse() {
                return RuleKey::Synthetic(n);
            }
        }
        RuleKey::Name(text.to_string())
    }

    /// Returns `true` for user-declared keys.
    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, RuleKey::Name(_))
    }

    /// Returns the name of a user-declared key.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            RuleKey::Name(name) => Some(name),
            RuleKey::Synthetic(_) => None,
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKey::Name(name) => f.write_str(name),
            RuleKey::Synthetic(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RuleKey {
    fn from(name: &str) -> Self {
        RuleKey::Name(name.to_string())
    }
}

impl From<String> for RuleKey {
    fn from(name: String) -> Self {
        RuleKey::Name(name)
    }
}

impl From<u32> for RuleKey {
    fn from(n: u32) -> Self {
        RuleKey::Synthetic(n)
    }
}

/// What a rule does when invoked.
///
/// The set of kinds is closed: every consumer matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Matches exactly one token by name.
    Terminal {
        /// Token name the rule is bound to.
        token: String,
        /// Whether a match becomes a leaf in the output tree.
        kept: bool,
    },
    /// Matches every child in declared order.
    Concatenation(Vec<RuleId>),
    /// Matches the first child, in declared order, that leads to a full parse.
    Alternation(Vec<RuleId>),
    /// Matches its child between `min` and `max` times.
    Repetition {
        /// The repeated rule.
        child: RuleId,
        /// Inclusive lower bound.
        min: usize,
        /// Inclusive upper bound, `None` when unbounded.
        max: Option<usize>,
    },
}

impl RuleKind {
    /// Returns the canonical name of this kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            RuleKind::Terminal { .. } => "TERMINAL",
            RuleKind::Concatenation(_) => "CONCATENATION",
            RuleKind::Alternation(_) => "ALTERNATION",
            RuleKind::Repetition { .. } => "REPETITION",
        }
    }

    /// Returns `true` for terminal rules.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RuleKind::Terminal { .. })
    }

    /// Child rules in declared order. Terminals have none, repetitions one.
    #[must_use]
    pub fn children(&self) -> &[RuleId] {
        match self {
            RuleKind::Terminal { .. } => &[],
            RuleKind::Concatenation(children) | RuleKind::Alternation(children) => children,
            RuleKind::Repetition { child, .. } => std::slice::from_ref(child),
        }
    }
}

/// A single entry of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDef {
    /// The key the rule was declared under.
    pub key: RuleKey,
    /// The rule's behaviour.
    pub kind: RuleKind,
    /// Name the rule contributes to the output tree.
    pub output_name: Option<String>,
    /// Whether the rule's matched children splice into its parent.
    pub transitional: bool,
}

/// An immutable grammar table.
///
/// Cloning is cheap enough for setup code, but the intended use is to build
/// one table and share it by reference across parses.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<RuleDef>,
    index: HashMap<RuleKey, RuleId>,
    root: RuleId,
}

impl Grammar {
    /// Assembles a table from already resolved definitions.
    ///
    /// Only [`GrammarBuilder`] calls this, after every reference was resolved.
    pub(crate) fn from_parts(rules: Vec<RuleDef>, root: RuleId) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.key.clone(), RuleId(i)))
            .collect();
        Self { rules, index, root }
    }

    pub(crate) fn id_at(index: usize) -> RuleId {
        RuleId(index)
    }

    /// The rule a parse starts from.
    #[must_use]
    pub fn root_id(&self) -> RuleId {
        self.root
    }

    /// Looks up a rule by key.
    #[must_use]
    pub fn id_of(&self, key: &RuleKey) -> Option<RuleId> {
        self.index.get(key).copied()
    }

    /// Looks up a named rule.
    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<RuleId> {
        self.id_of(&RuleKey::Name(name.to_string()))
    }

    /// Full definition of a rule, or `None` if `id` was not issued by this
    /// grammar.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&RuleDef> {
        self.rules.get(id.0)
    }

    /// Returns `true` if `id` belongs to this grammar's table.
    #[must_use]
    pub fn contains(&self, id: RuleId) -> bool {
        id.0 < self.rules.len()
    }

    /// Full definition of a rule.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this grammar.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> &RuleDef {
        &self.rules[id.0]
    }

    /// The key a rule was declared under.
    #[must_use]
    pub fn key(&self, id: RuleId) -> &RuleKey {
        &self.rule(id).key
    }

    /// The rule's kind.
    #[must_use]
    pub fn kind(&self, id: RuleId) -> &RuleKind {
        &self.rule(id).kind
    }

    /// The rule's children in declared order.
    #[must_use]
    pub fn children(&self, id: RuleId) -> &[RuleId] {
        self.kind(id).children()
    }

    /// Token name bound to a terminal.
    #[must_use]
    pub fn token_name(&self, id: RuleId) -> Option<&str> {
        match self.kind(id) {
            RuleKind::Terminal { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Whether a terminal's match is kept as a leaf.
    #[must_use]
    pub fn is_kept(&self, id: RuleId) -> bool {
        matches!(self.kind(id), RuleKind::Terminal { kept: true, .. })
    }

    /// Lower repetition bound; zero for anything but a repetition.
    #[must_use]
    pub fn min(&self, id: RuleId) -> usize {
        match self.kind(id) {
            RuleKind::Repetition { min, .. } => *min,
            _ => 0,
        }
    }

    /// Upper repetition bound, `None` when unbounded or not a repetition.
    #[must_use]
    pub fn max(&self, id: RuleId) -> Option<usize> {
        match self.kind(id) {
            RuleKind::Repetition { max, .. } => *max,
            _ => None,
        }
    }

    /// Name the rule gives its tree node, if any.
    #[must_use]
    pub fn output_name(&self, id: RuleId) -> Option<&str> {
        self.rule(id).output_name.as_deref()
    }

    /// Whether the rule produces no node of its own.
    #[must_use]
    pub fn is_transitional(&self, id: RuleId) -> bool {
        self.rule(id).transitional
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the table holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over every rule in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &RuleDef)> {
        self.rules.iter().enumerate().map(|(i, rule)| (RuleId(i), rule))
    }
}

/// Errors raised while constructing a grammar table.
///
/// All of them are fatal and point at a mistake in the grammar itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// The input JSON was syntactically invalid or structurally mismatched.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Two rules were declared under the same key.
    #[error("rule '{0}' is declared more than once")]
    DuplicateRule(RuleKey),

    /// A rule refers to a key that was never declared.
    #[error("undefined rule '{rule}' referenced by '{referenced_by}'")]
    UndefinedRule {
        /// The missing key.
        rule: RuleKey,
        /// Where the reference was made.
        referenced_by: String,
    },

    /// A finite repetition whose lower bound exceeds its upper bound.
    #[error("repetition '{rule}' has inverted bounds {{{min},{max}}}")]
    InvertedBounds {
        /// The offending repetition.
        rule: RuleKey,
        /// Declared lower bound.
        min: usize,
        /// Declared upper bound.
        max: usize,
    },

    /// No root rule could be determined.
    #[error("cannot resolve root rule{}", .0.as_ref().map(|k| format!(" '{k}'")).unwrap_or_default())]
    UnresolvedRoot(Option<RuleKey>),

    /// A rule handle that this grammar did not issue.
    #[error("rule {0} does not belong to this grammar")]
    UnknownRule(RuleId),

    /// A definition lacks data its kind requires.
    #[error("malformed rule '{rule}': {reason}")]
    MalformedRule {
        /// The offending rule.
        rule: RuleKey,
        /// What is wrong with it.
        reason: String,
    },
}
