//! Execution history of a parse.
//!
//! The runtime simulates recursive descent with an explicit stack of
//! [`Step`]s and logs what it did as [`Record`]s. Choice points keep a
//! snapshot of the pending steps so that backtracking can resume from them.
//! Snapshots are persistent vectors: taking one is O(1) and shares structure
//! with the live stack.

use crate::grammar::{Grammar, RuleId};
use crate::token::Token;
use std::fmt;

/// Saved pending-work stack, top at the back.
pub type Continuation = im::Vector<Step>;

/// One invocation of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The invoked rule.
    pub rule: RuleId,
    /// Alternative index for alternations, committed repeat count for
    /// repetitions, 0 otherwise.
    pub state: usize,
    /// Work left after this choice point, present only on retry points.
    pub continuation: Option<Continuation>,
}

impl Invocation {
    /// An invocation without a continuation.
    #[must_use]
    pub fn new(rule: RuleId, state: usize) -> Self {
        Self {
            rule,
            state,
            continuation: None,
        }
    }

    /// An invocation that can be resumed from `continuation`.
    #[must_use]
    pub fn resumable(rule: RuleId, state: usize, continuation: Continuation) -> Self {
        Self {
            rule,
            state,
            continuation: Some(continuation),
        }
    }
}

/// A pending instruction on the runtime's work stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Expand a rule.
    Entry(Invocation),
    /// Close a rule.
    Exit(Invocation),
}

impl Step {
    /// `Entry(rule, state)` without a continuation.
    #[must_use]
    pub fn entry(rule: RuleId, state: usize) -> Self {
        Step::Entry(Invocation::new(rule, state))
    }

    /// `Exit(rule, state)` without a continuation.
    #[must_use]
    pub fn exit(rule: RuleId, state: usize) -> Self {
        Step::Exit(Invocation::new(rule, state))
    }
}

/// A consumed terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    /// The token that was matched.
    pub token: Token,
    /// Whether the match becomes a leaf.
    pub kept: bool,
}

/// An entry of the execution history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A rule invocation began.
    Entry {
        /// The invocation.
        call: Invocation,
        /// Stream offset when it began.
        offset: usize,
    },
    /// A rule invocation ended.
    Exit {
        /// The invocation.
        call: Invocation,
        /// Stream offset when it ended.
        offset: usize,
    },
    /// A terminal consumed a token.
    Matched(Lexeme),
}

impl Record {
    /// Stream offset at which the record was made.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Record::Entry { offset, .. } | Record::Exit { offset, .. } => *offset,
            Record::Matched(lexeme) => lexeme.token.offset,
        }
    }

    /// The rule an entry or exit belongs to.
    #[must_use]
    pub fn rule(&self) -> Option<RuleId> {
        match self {
            Record::Entry { call, .. } | Record::Exit { call, .. } => Some(call.rule),
            Record::Matched(_) => None,
        }
    }

    /// Renders the record with rule keys taken from `grammar`.
    #[must_use]
    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> DisplayRecord<'a> {
        DisplayRecord {
            record: self,
            grammar,
        }
    }
}

/// Helper returned by [`Record::display`].
pub struct DisplayRecord<'a> {
    record: &'a Record,
    grammar: &'a Grammar,
}

impl fmt::Display for DisplayRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            Record::Entry { call, offset } => write!(
                f,
                "entry {}({}) @{offset}",
                self.grammar.key(call.rule),
                call.state
            ),
            Record::Exit { call, offset } => write!(
                f,
                "exit {}({}) @{offset}",
                self.grammar.key(call.rule),
                call.state
            ),
            Record::Matched(lexeme) => write!(
                f,
                "token {} @{}{}",
                lexeme.token,
                lexeme.token.offset,
                if lexeme.kept { "" } else { " skipped" }
            ),
        }
    }
}

/// The ordered history of a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    records: Vec<Record>,
}

impl Trace {
    /// All records in execution order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Tokens consumed by the parse, in order.
    pub fn lexemes(&self) -> impl Iterator<Item = &Lexeme> {
        self.records.iter().filter_map(|record| match record {
            Record::Matched(lexeme) => Some(lexeme),
            _ => None,
        })
    }
}

impl From<Vec<Record>> for Trace {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
