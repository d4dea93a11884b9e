//! Chainable construction of a [`Grammar`] table.
//!
//! Rules refer to each other by [`RuleKey`], so declarations may appear in any
//! order and may be recursive. Every reference is resolved, and every
//! structural mistake reported, in [`GrammarBuilder::build`].

use super::{Grammar, GrammarError, RuleDef, RuleId, RuleKey, RuleKind};
use std::collections::HashMap;

/// Collects rule declarations and turns them into an immutable [`Grammar`].
///
/// Named keys default to non-transitional rules whose output name is the key
/// itself; synthetic keys default to transitional rules without an output
/// name. Both defaults can be overridden with [`GrammarBuilder::output_name`]
/// and [`GrammarBuilder::transitional`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    declarations: Vec<Declaration>,
    root: Option<RuleKey>,
    errors: Vec<GrammarError>,
}

#[derive(Debug, Clone)]
struct Declaration {
    key: RuleKey,
    body: Body,
    output_name: Option<String>,
    transitional: bool,
}

#[derive(Debug, Clone)]
enum Body {
    Terminal {
        token: String,
        kept: bool,
    },
    Concatenation(Vec<RuleKey>),
    Alternation(Vec<RuleKey>),
    Repetition {
        child: RuleKey,
        min: usize,
        max: Option<usize>,
    },
}

impl GrammarBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a terminal bound to the token named `token`.
    #[must_use]
    pub fn terminal(self, key: impl Into<RuleKey>, token: &str, kept: bool) -> Self {
        self.declare(
            key.into(),
            Body::Terminal {
                token: token.to_string(),
                kept,
            },
        )
    }

    /// Declares a sequence of `children`.
    #[must_use]
    pub fn concatenation<C>(self, key: impl Into<RuleKey>, children: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<RuleKey>,
    {
        let children = children.into_iter().map(Into::into).collect();
        self.declare(key.into(), Body::Concatenation(children))
    }

    /// Declares a choice between `children`, tried in the given order.
    #[must_use]
    pub fn alternation<C>(self, key: impl Into<RuleKey>, children: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<RuleKey>,
    {
        let children = children.into_iter().map(Into::into).collect();
        self.declare(key.into(), Body::Alternation(children))
    }

    /// Declares `child` repeated between `min` and `max` times (inclusive).
    #[must_use]
    pub fn repetition(
        self,
        key: impl Into<RuleKey>,
        child: impl Into<RuleKey>,
        min: usize,
        max: Option<usize>,
    ) -> Self {
        self.declare(
            key.into(),
            Body::Repetition {
                child: child.into(),
                min,
                max,
            },
        )
    }

    /// Shorthand for a `{0,1}` repetition.
    #[must_use]
    pub fn optional(self, key: impl Into<RuleKey>, child: impl Into<RuleKey>) -> Self {
        self.repetition(key, child, 0, Some(1))
    }

    /// Sets (or clears) the name an already declared rule gives its node.
    #[must_use]
    pub fn output_name(mut self, key: impl Into<RuleKey>, name: Option<&str>) -> Self {
        let key = key.into();
        match self.declaration_mut(&key) {
            Some(decl) => decl.output_name = name.map(str::to_string),
            None => self.errors.push(GrammarError::UndefinedRule {
                rule: key,
                referenced_by: "output_name".to_string(),
            }),
        }
        self
    }

    /// Marks an already declared rule as transitional or not.
    #[must_use]
    pub fn transitional(mut self, key: impl Into<RuleKey>, transitional: bool) -> Self {
        let key = key.into();
        match self.declaration_mut(&key) {
            Some(decl) => decl.transitional = transitional,
            None => self.errors.push(GrammarError::UndefinedRule {
                rule: key,
                referenced_by: "transitional".to_string(),
            }),
        }
        self
    }

    /// Selects the rule parsing starts from.
    ///
    /// Without it, the first named non-terminal in declaration order is used.
    #[must_use]
    pub fn root(mut self, key: impl Into<RuleKey>) -> Self {
        self.root = Some(key.into());
        self
    }

    /// Resolves every reference and produces the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`GrammarError`] found: a duplicate or undefined key,
    /// an unresolvable root, or a repetition with `min > max`.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        let mut ids: HashMap<RuleKey, RuleId> = HashMap::new();
        for (i, decl) in self.declarations.iter().enumerate() {
            if ids.insert(decl.key.clone(), Grammar::id_at(i)).is_some() {
                return Err(GrammarError::DuplicateRule(decl.key.clone()));
            }
        }

        let resolve = |key: &RuleKey, owner: &RuleKey| {
            ids.get(key)
                .copied()
                .ok_or_else(|| GrammarError::UndefinedRule {
                    rule: key.clone(),
                    referenced_by: owner.to_string(),
                })
        };

        let mut rules = Vec::with_capacity(self.declarations.len());
        for decl in self.declarations {
            let kind = match decl.body {
                Body::Terminal { token, kept } => RuleKind::Terminal { token, kept },
                Body::Concatenation(children) => RuleKind::Concatenation(
                    children
                        .iter()
                        .map(|child| resolve(child, &decl.key))
                        .collect::<Result<_, _>>()?,
                ),
                Body::Alternation(children) => RuleKind::Alternation(
                    children
                        .iter()
                        .map(|child| resolve(child, &decl.key))
                        .collect::<Result<_, _>>()?,
                ),
                Body::Repetition { child, min, max } => RuleKind::Repetition {
                    child: resolve(&child, &decl.key)?,
                    min,
                    max,
                },
            };
            rules.push(RuleDef {
                key: decl.key,
                kind,
                output_name: decl.output_name,
                transitional: decl.transitional,
            });
        }

        let root = match self.root {
            Some(key) => match ids.get(&key) {
                Some(id) => *id,
                None => return Err(GrammarError::UnresolvedRoot(Some(key))),
            },
            None => default_root(&rules)?,
        };

        let grammar = Grammar::from_parts(rules, root);
        crate::validate::validate(&grammar)?;

        log::debug!(
            "built grammar with {} rules, root '{}'",
            grammar.len(),
            grammar.key(root)
        );
        Ok(grammar)
    }

    fn declare(mut self, key: RuleKey, body: Body) -> Self {
        let output_name = key.name().map(str::to_string);
        let transitional = !key.is_named();
        self.declarations.push(Declaration {
            key,
            body,
            output_name,
            transitional,
        });
        self
    }

    fn declaration_mut(&mut self, key: &RuleKey) -> Option<&mut Declaration> {
        self.declarations.iter_mut().rev().find(|decl| &decl.key == key)
    }
}

fn default_root(rules: &[RuleDef]) -> Result<RuleId, GrammarError> {
    rules
        .iter()
        .position(|rule| rule.key.is_named() && !rule.kind.is_terminal())
        .or(if rules.is_empty() { None } else { Some(0) })
        .map(Grammar::id_at)
        .ok_or(GrammarError::UnresolvedRoot(None))
}
