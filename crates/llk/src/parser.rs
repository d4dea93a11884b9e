//! The one-call entry point: tokens in, tree out.

use crate::ast::Node;
use crate::builder;
use crate::errors::{Error, SyntaxError};
use crate::grammar::{Grammar, GrammarError, RuleId, RuleKey};
use crate::runtime::{Runtime, RuntimeConfig};
use crate::token::TokenBuffer;
use crate::trace::Trace;

/// Token name lexers use for input they cannot classify.
pub const DEFAULT_UNKNOWN_TOKEN: &str = "T_UNKNOWN";

/// Options of a [`Parser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Rule to start from instead of the grammar's root.
    pub root: Option<String>,
    /// Token name rejected up front as [`SyntaxError::UnrecognizedToken`].
    pub unknown_token: String,
    /// Settings handed to the [`Runtime`].
    pub runtime: RuntimeConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            root: None,
            unknown_token: DEFAULT_UNKNOWN_TOKEN.to_string(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// A grammar bundled with everything needed to turn tokens into a tree.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    root: RuleId,
    config: ParserConfig,
}

impl Parser {
    /// A parser with default settings.
    #[must_use]
    pub fn new(grammar: Grammar) -> Self {
        let root = grammar.root_id();
        Self {
            grammar,
            root,
            config: ParserConfig::default(),
        }
    }

    /// A parser with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnresolvedRoot`] if `config.root` names no
    /// rule of `grammar`.
    pub fn with_config(grammar: Grammar, config: ParserConfig) -> Result<Self, GrammarError> {
        let root = match &config.root {
            None => grammar.root_id(),
            Some(name) => {
                let key = RuleKey::parse(name);
                grammar
                    .id_of(&key)
                    .ok_or(GrammarError::UnresolvedRoot(Some(key)))?
            }
        };
        Ok(Self {
            grammar,
            root,
            config,
        })
    }

    /// The grammar being parsed against.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The settings in use.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Runs the grammar over `tokens` and returns the execution trace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] if the input contains an unrecognized token
    /// or does not match the grammar.
    pub fn trace(&self, tokens: impl Into<TokenBuffer>) -> Result<Trace, Error> {
        let mut tokens = tokens.into();

        if let Some(token) = tokens
            .tokens()
            .iter()
            .find(|token| token.name == self.config.unknown_token)
        {
            log::debug!("rejecting unrecognized token {token}");
            return Err(SyntaxError::UnrecognizedToken {
                token: token.clone(),
            }
            .into());
        }

        let runtime = Runtime::with_config(&self.grammar, self.config.runtime.clone())
            .starting_at(self.root)?;
        Ok(runtime.parse(&mut tokens)?)
    }

    /// Parses `tokens` into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] as [`Parser::trace`] does, and
    /// [`Error::Build`] if the trace cannot be reduced to a single node,
    /// which happens when the derivation keeps no token and its root has no
    /// output name.
    pub fn parse(&self, tokens: impl Into<TokenBuffer>) -> Result<Node, Error> {
        let trace = self.trace(tokens)?;
        Ok(builder::build(&trace, &self.grammar)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BuildError;
    use crate::grammar::GrammarBuilder;
    use crate::token::Token;
    use crate::trace::Record;

    fn grammar() -> Grammar {
        GrammarBuilder::new()
            .concatenation("Pair", ["Key", "colon", "Value"])
            .concatenation("Key", ["string"])
            .concatenation("Value", ["string"])
            .terminal("string", "T_STRING", true)
            .terminal("colon", "T_COLON", false)
            .build()
            .unwrap()
    }

    fn pair() -> Vec<Token> {
        vec![
            Token::new("T_STRING", "a", 0),
            Token::new("T_COLON", ":", 3),
            Token::new("T_STRING", "b", 5),
        ]
    }

    #[test]
    fn test_parse() {
        let tree = Parser::new(grammar()).parse(pair()).unwrap();
        assert_eq!(tree.name(), "Pair");
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.first("Value", None).map(Node::text).as_deref(), Some("b"));
    }

    #[test]
    fn test_root_override() {
        let config = ParserConfig {
            root: Some("Key".to_string()),
            ..ParserConfig::default()
        };
        let parser = Parser::with_config(grammar(), config).unwrap();
        let tree = parser.parse(vec![Token::new("T_STRING", "a", 0)]).unwrap();
        assert_eq!(tree.name(), "Key");

        let config = ParserConfig {
            root: Some("Missing".to_string()),
            ..ParserConfig::default()
        };
        assert!(matches!(
            Parser::with_config(grammar(), config),
            Err(GrammarError::UnresolvedRoot(Some(_)))
        ));
    }

    #[test]
    fn test_unrecognized_token_rejected_before_parsing() {
        let mut tokens = pair();
        tokens[2] = Token::new(DEFAULT_UNKNOWN_TOKEN, "?", 5);

        let err = Parser::new(grammar()).parse(tokens).unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax(SyntaxError::UnrecognizedToken { ref token }) if token.offset == 5
        ));
    }

    #[test]
    fn test_trace_ends_with_root_exit() {
        let parser = Parser::new(grammar());
        let trace = parser.trace(pair()).unwrap();
        let last = trace.records().last().and_then(Record::rule);
        assert_eq!(last, Some(parser.grammar().root_id()));
        assert_eq!(trace.lexemes().count(), 3);
    }

    #[test]
    fn test_nothing_kept_under_unnamed_root() {
        let grammar = GrammarBuilder::new()
            .concatenation("Punct", ["colon"])
            .output_name("Punct", None)
            .terminal("colon", "T_COLON", false)
            .build()
            .unwrap();

        let err = Parser::new(grammar)
            .parse(vec![Token::new("T_COLON", ":", 0)])
            .unwrap_err();
        assert_eq!(err, Error::Build(BuildError::NoRoot));
    }
}
