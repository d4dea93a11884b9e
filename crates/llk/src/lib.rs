//! A table-driven LL(k) backtracking parser engine.
//!
//! Grammars are data: a [`Grammar`] is a table of terminal, concatenation,
//! alternation and repetition rules, built in code with a [`GrammarBuilder`]
//! or loaded from JSON with [`parse_grammar`]. A [`Parser`] runs the table
//! over a token sequence and reduces the resulting [`Trace`] to a [`Node`]
//! tree.
//!
//! ```
//! use llk::{GrammarBuilder, Parser, Token};
//!
//! let grammar = GrammarBuilder::new()
//!     .concatenation("Greeting", ["hello", "name"])
//!     .terminal("hello", "T_HELLO", false)
//!     .terminal("name", "T_NAME", true)
//!     .build()?;
//!
//! let tree = Parser::new(grammar).parse(vec![
//!     Token::new("T_HELLO", "hello", 0),
//!     Token::new("T_NAME", "world", 6),
//! ])?;
//! assert_eq!(tree.to_string(), ">  Greeting\n>  >  token(T_NAME, world)");
//! # Ok::<(), llk::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::multiple_crate_versions)]

/// The output tree.
pub mod ast;

/// Reduction of traces to trees.
pub mod builder;

/// Error types for parsing and tree building.
pub mod errors;

/// The grammar table and the ways to construct one.
///
/// Rules are addressed by dense [`RuleId`](grammar::RuleId)s once a grammar
/// is built; keys only matter while declaring rules and when reporting.
pub mod grammar;

/// The parser façade tying the runtime and the builder together.
pub mod parser;

/// The backtracking interpreter.
pub mod runtime;

/// Tokens and token streams.
pub mod token;

/// Trace records and the runtime's work items.
pub mod trace;

/// Static checks run when a grammar is built.
///
/// Only inverted repetition bounds are rejected. Everything else found here
/// (unreachable rules, left recursion, repetitions over nullable rules) is
/// reported through `log` and left to the runtime's step limit.
pub mod validate;

pub use ast::{Leaf, Node, RuleNode};
pub use builder::{build, TreeBuilder};
pub use errors::{BuildError, Error, SyntaxError};
pub use grammar::{parse_grammar, Grammar, GrammarBuilder, GrammarError, RuleId, RuleKey, RuleKind};
pub use parser::{Parser, ParserConfig};
pub use runtime::{Runtime, RuntimeConfig};
pub use token::{Token, TokenBuffer, TokenStream};
pub use trace::{Record, Trace};
pub use validate::validate;
