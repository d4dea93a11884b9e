//! Failures surfaced by parsing and tree building.
//!
//! - [`SyntaxError`]: the input is not derivable from the root rule.
//! - [`BuildError`]: a trace could not be reduced to a tree. Traces produced
//!   by the runtime never trigger this; hand-made ones can.
//! - [`Error`]: everything [`Parser`](crate::Parser) can return.

use crate::grammar::GrammarError;
use crate::token::Token;

/// The input does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// The lexer produced a token it could not classify.
    #[error("unrecognized token {token} at offset {}", .token.offset)]
    UnrecognizedToken {
        /// The offending token.
        token: Token,
    },

    /// Backtracking was exhausted; `token` is the furthest token reached.
    #[error("unexpected token {token} at offset {}", .token.offset)]
    UnexpectedToken {
        /// The offending token.
        token: Token,
    },

    /// Backtracking was exhausted after reaching the end of input.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd {
        /// Offset of the end of input.
        offset: usize,
    },

    /// The configured step budget ran out before the parse finished.
    #[error("step limit of {limit} exceeded at offset {offset}")]
    StepLimitExceeded {
        /// The configured budget.
        limit: usize,
        /// Stream offset when the budget ran out.
        offset: usize,
    },
}

impl SyntaxError {
    /// Source offset the error points at.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnrecognizedToken { token } | SyntaxError::UnexpectedToken { token } => {
                token.offset
            }
            SyntaxError::UnexpectedEnd { offset } | SyntaxError::StepLimitExceeded { offset, .. } => {
                *offset
            }
        }
    }

    /// The offending token, when there is one.
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        match self {
            SyntaxError::UnrecognizedToken { token } | SyntaxError::UnexpectedToken { token } => {
                Some(token)
            }
            SyntaxError::UnexpectedEnd { .. } | SyntaxError::StepLimitExceeded { .. } => None,
        }
    }
}

/// A trace that does not describe a well-nested derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// There was nothing to build from.
    #[error("cannot build a tree from an empty trace")]
    EmptyTrace,

    /// An exit record without a matching entry.
    #[error("exit of '{rule}' at record {index} has no matching entry")]
    UnbalancedExit {
        /// Position in the trace.
        index: usize,
        /// Key of the exited rule.
        rule: String,
    },

    /// An exit record closing a different rule than the innermost open one.
    #[error("record {index} exits '{found}' while '{expected}' is open")]
    MismatchedExit {
        /// Position in the trace.
        index: usize,
        /// Key of the innermost open rule.
        expected: String,
        /// Key of the exited rule.
        found: String,
    },

    /// The trace ended with rules still open.
    #[error("rule '{rule}' is never exited")]
    UnclosedRule {
        /// Key of the innermost open rule.
        rule: String,
    },

    /// A record refers to a rule the grammar does not have.
    #[error("record {index} refers to rule #{rule}, which is not in the grammar")]
    UnknownRule {
        /// Position in the trace.
        index: usize,
        /// Index of the unknown rule.
        rule: usize,
    },

    /// The derivation produced no node at all.
    #[error("trace reduced to no nodes")]
    NoRoot,

    /// The derivation produced several top-level nodes.
    #[error("trace reduced to {count} top-level nodes")]
    AmbiguousRoot {
        /// How many nodes were left.
        count: usize,
    },
}

/// Any failure of [`Parser`](crate::Parser).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The grammar could not be prepared.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The input did not parse.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The trace could not be reduced.
    #[error(transparent)]
    Build(#[from] BuildError),
}
