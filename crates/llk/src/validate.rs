//! Validation routines for grammar tables.
//!
//! This module performs structural checks over a resolved
//! [`Grammar`](crate::grammar::Grammar): repetition bounds, reachability from
//! the root, and left recursion. Only malformed bounds are fatal; the other
//! findings are logged, since the grammar is still usable but the author most
//! likely made a mistake.

use crate::grammar::{Grammar, GrammarError, RuleId, RuleKind};

/// Performs semantic validation of a resolved grammar.
///
/// This function runs several consistency passes over the grammar:
///
/// - Checks that finite repetitions have `min <= max`.
/// - Warns about rules unreachable from the root.
/// - Warns about left recursion, which the backtracking runtime cannot
///   terminate on.
/// - Warns about unbounded repetitions of rules that can match nothing.
///
/// # Errors
///
/// Returns [`GrammarError::InvertedBounds`] for the first repetition whose
/// bounds are inverted.
pub fn validate(grammar: &Grammar) -> Result<(), GrammarError> {
    check_bounds(grammar)?;

    if grammar.kind(grammar.root_id()).is_terminal() {
        log::debug!(
            "root rule '{}' is a terminal",
            grammar.key(grammar.root_id())
        );
    }

    check_unreachable_rules(grammar);

    let nullable = nullable_rules(grammar);
    for id in left_recursive_rules(grammar, &nullable) {
        log::warn!(
            "rule '{}' is left-recursive; parsing it will not terminate",
            grammar.key(id)
        );
    }
    check_nullable_repetitions(grammar, &nullable);

    Ok(())
}

fn check_bounds(grammar: &Grammar) -> Result<(), GrammarError> {
    for (_, rule) in grammar.iter() {
        if let RuleKind::Repetition {
            min,
            max: Some(max),
            ..
        } = rule.kind
        {
            if min > max {
                return Err(GrammarError::InvertedBounds {
                    rule: rule.key.clone(),
                    min,
                    max,
                });
            }
        }
    }
    Ok(())
}

/// Rules that cannot be reached from the root.
pub(crate) fn unreachable_rules(grammar: &Grammar) -> Vec<RuleId> {
    let mut reachable = vec![false; grammar.len()];
    let mut to_visit = vec![grammar.root_id()];

    while let Some(id) = to_visit.pop() {
        if std::mem::replace(&mut reachable[id.index()], true) {
            continue; // Already visited
        }
        to_visit.extend_from_slice(grammar.children(id));
    }

    grammar
        .iter()
        .filter(|(id, _)| !reachable[id.index()])
        .map(|(id, _)| id)
        .collect()
}

fn check_unreachable_rules(grammar: &Grammar) {
    for id in unreachable_rules(grammar) {
        log::warn!("unreachable rule '{}'", grammar.key(id));
    }
}

/// For every rule, whether it can succeed without consuming a token.
pub(crate) fn nullable_rules(grammar: &Grammar) -> Vec<bool> {
    let mut nullable = vec![false; grammar.len()];

    loop {
        let mut changed = false;
        for (id, rule) in grammar.iter() {
            if nullable[id.index()] {
                continue;
            }
            let now = match &rule.kind {
                RuleKind::Terminal { .. } => false,
                RuleKind::Concatenation(children) => {
                    children.iter().all(|child| nullable[child.index()])
                }
                RuleKind::Alternation(children) => {
                    children.iter().any(|child| nullable[child.index()])
                }
                RuleKind::Repetition { child, min, .. } => *min == 0 || nullable[child.index()],
            };
            if now {
                nullable[id.index()] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// Rules the runtime may invoke first, before consuming anything, when
/// expanding `id`.
fn left_corners(grammar: &Grammar, nullable: &[bool], id: RuleId) -> Vec<RuleId> {
    match grammar.kind(id) {
        RuleKind::Terminal { .. } => Vec::new(),
        RuleKind::Concatenation(children) => {
            let mut corners = Vec::new();
            for &child in children {
                corners.push(child);
                if !nullable[child.index()] {
                    break;
                }
            }
            corners
        }
        RuleKind::Alternation(children) => children.clone(),
        RuleKind::Repetition { child, max, .. } => {
            if *max == Some(0) {
                Vec::new()
            } else {
                vec![*child]
            }
        }
    }
}

/// Rules that can invoke themselves again without consuming a token.
pub(crate) fn left_recursive_rules(grammar: &Grammar, nullable: &[bool]) -> Vec<RuleId> {
    let mut found = Vec::new();

    for (id, _) in grammar.iter() {
        let mut seen = vec![false; grammar.len()];
        let mut to_visit = left_corners(grammar, nullable, id);

        while let Some(next) = to_visit.pop() {
            if next == id {
                found.push(id);
                break;
            }
            if std::mem::replace(&mut seen[next.index()], true) {
                continue;
            }
            to_visit.extend(left_corners(grammar, nullable, next));
        }
    }

    found
}

/// Unbounded repetitions whose child can match nothing.
pub(crate) fn nullable_repetitions(grammar: &Grammar, nullable: &[bool]) -> Vec<RuleId> {
    grammar
        .iter()
        .filter(|(_, rule)| {
            matches!(
                rule.kind,
                RuleKind::Repetition { child, max: None, .. } if nullable[child.index()]
            )
        })
        .map(|(id, _)| id)
        .collect()
}

fn check_nullable_repetitions(grammar: &Grammar, nullable: &[bool]) {
    for id in nullable_repetitions(grammar, nullable) {
        log::warn!(
            "repetition '{}' is unbounded over '{}', which can match nothing",
            grammar.key(id),
            grammar.key(grammar.children(id)[0])
        );
    }
}
