//! Serialised grammar definitions.
//!
//! This is the format an offline grammar compiler emits: a flat list of rules
//! keyed by id, where all-digit ids denote synthetic (transitional) rules. It
//! is deserialised with [`facet_json`] and fed through [`GrammarBuilder`].

use super::{Grammar, GrammarBuilder, GrammarError, RuleKey};
use facet::Facet;

/// A complete grammar in its serialised form.
#[derive(Debug, Clone, Facet)]
pub struct GrammarDefinition {
    /// Id of the root rule. Defaults to the first named non-terminal.
    #[facet(default)]
    pub root: Option<String>,

    /// Every rule, in declaration order.
    pub rules: Vec<RuleDefinition>,
}

/// One rule of a [`GrammarDefinition`].
///
/// Which optional fields are meaningful depends on [`RuleType`]: terminals use
/// `token` and `kept`, repetitions use `min`, `max` and exactly one member,
/// concatenations and alternations use `members`.
#[derive(Debug, Clone, Facet)]
pub struct RuleDefinition {
    /// The rule's key. All-digit ids are synthetic.
    pub id: String,

    /// The discriminant identifying what kind of rule this is.
    #[facet(rename = "type")]
    pub rule_type: RuleType,

    /// Token name a terminal is bound to.
    #[facet(default)]
    pub token: Option<String>,

    /// Whether a terminal's match is kept in the tree. Defaults to `true`.
    #[facet(default)]
    pub kept: Option<bool>,

    /// Ids of child rules, in order.
    #[facet(default)]
    pub members: Vec<String>,

    /// Lower repetition bound. Defaults to 0.
    #[facet(default)]
    pub min: Option<u32>,

    /// Upper repetition bound. Absent means unbounded.
    #[facet(default)]
    pub max: Option<u32>,

    /// Output name overriding the default derived from `id`.
    #[facet(default)]
    pub name: Option<String>,

    /// Overrides whether the rule is transitional.
    #[facet(default)]
    pub transitional: Option<bool>,
}

/// The enumeration of all rule kinds in serialised form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum RuleType {
    /// A single token match.
    #[facet(rename = "TERMINAL")]
    Terminal,
    /// A sequential composition of member rules.
    #[facet(rename = "CONCATENATION")]
    Concatenation,
    /// A rule that matches one of several alternatives.
    #[facet(rename = "ALTERNATION")]
    Alternation,
    /// A bounded repetition of a single member.
    #[facet(rename = "REPETITION")]
    Repetition,
}

impl RuleDefinition {
    /// Returns the canonical string name of this rule type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.rule_type {
            RuleType::Terminal => "TERMINAL",
            RuleType::Concatenation => "CONCATENATION",
            RuleType::Alternation => "ALTERNATION",
            RuleType::Repetition => "REPETITION",
        }
    }

    /// The parsed key of this rule.
    #[must_use]
    pub fn key(&self) -> RuleKey {
        RuleKey::parse(&self.id)
    }

    fn malformed(&self, reason: &str) -> GrammarError {
        GrammarError::MalformedRule {
            rule: self.key(),
            reason: reason.to_string(),
        }
    }
}

impl GrammarDefinition {
    /// Turns the definition into a validated [`Grammar`].
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::MalformedRule`] for terminals without a token or
    /// repetitions without exactly one member, and any error raised by
    /// [`GrammarBuilder::build`].
    pub fn into_grammar(self) -> Result<Grammar, GrammarError> {
        let mut builder = GrammarBuilder::new();

        for rule in &self.rules {
            let key = rule.key();
            let members = rule.members.iter().map(|m| RuleKey::parse(m));

            builder = match rule.rule_type {
                RuleType::Terminal => {
                    let token = rule
                        .token
                        .as_deref()
                        .ok_or_else(|| rule.malformed("terminal without a token"))?;
                    builder.terminal(key.clone(), token, rule.kept.unwrap_or(true))
                }
                RuleType::Concatenation => builder.concatenation(key.clone(), members),
                RuleType::Alternation => builder.alternation(key.clone(), members),
                RuleType::Repetition => {
                    let [child] = rule.members.as_slice() else {
                        return Err(rule.malformed("repetition needs exactly one member"));
                    };
                    builder.repetition(
                        key.clone(),
                        RuleKey::parse(child),
                        rule.min.unwrap_or(0) as usize,
                        rule.max.map(|max| max as usize),
                    )
                }
            };

            if let Some(name) = &rule.name {
                builder = builder.output_name(key.clone(), Some(name));
            }
            if let Some(transitional) = rule.transitional {
                builder = builder.transitional(key, transitional);
            }
        }

        if let Some(root) = &self.root {
            builder = builder.root(RuleKey::parse(root));
        }

        builder.build()
    }
}

/// Parse a JSON grammar definition into a validated [`Grammar`].
///
/// # Errors
///
/// Returns [`GrammarError::JsonParse`] if the provided string is not valid JSON
/// or fails schema deserialization, and any construction error otherwise.
pub fn parse_grammar(json: &str) -> Result<Grammar, GrammarError> {
    let definition: GrammarDefinition =
        facet_json::from_str(json).map_err(|e| GrammarError::JsonParse(e.to_string()))?;
    definition.into_grammar()
}
