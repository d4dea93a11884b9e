//! Reduction of a linear [`Trace`] into a tree of [`Node`]s.
//!
//! The trace is walked once with an explicit stack of open rules. Nodes and
//! markers accumulate on a second stack; when a non-transitional rule exits,
//! everything above its boundary marker becomes its children. Transitional
//! rules leave their children where they are, so they are absorbed by the
//! nearest enclosing rule that does produce a node.

use crate::ast::{Leaf, Node, RuleNode};
use crate::errors::BuildError;
use crate::grammar::{Grammar, RuleId};
use crate::trace::{Record, Trace};

/// Item of the accumulator.
#[derive(Debug)]
enum Slot<'g> {
    /// Start of the children of a non-transitional rule.
    Boundary(RuleId),
    /// Output name offered by a rule to its enclosing node.
    Name(&'g str),
    /// A finished node.
    Node(Node),
}

/// An entry that is still waiting for its exit.
#[derive(Debug)]
struct Open {
    rule: RuleId,
    offset: usize,
}

/// Builds the tree described by `trace`.
///
/// Rules that matched nothing are left out entirely, except for the root,
/// which always yields a node when it has a name.
///
/// # Errors
///
/// Returns a [`BuildError`] when the trace is empty or its entries and exits
/// are not properly nested, and when the reduction does not leave exactly one
/// top-level node.
pub fn build(trace: &Trace, grammar: &Grammar) -> Result<Node, BuildError> {
    TreeBuilder::new(grammar).build(trace)
}

/// Reusable reducer bound to one grammar.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'g> {
    grammar: &'g Grammar,
}

impl<'g> TreeBuilder<'g> {
    /// A builder reading names and transitional flags from `grammar`.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Builds the tree described by `trace`. See [`build`].
    ///
    /// # Errors
    ///
    /// See [`build`].
    pub fn build(&self, trace: &Trace) -> Result<Node, BuildError> {
        let records = trace.records();
        if records.is_empty() {
            return Err(BuildError::EmptyTrace);
        }

        let mut slots: Vec<Slot<'g>> = Vec::new();
        let mut open: Vec<Open> = Vec::new();
        let mut i = 0;

        while i < records.len() {
            if let Some(rule) = records[i].rule() {
                if !self.grammar.contains(rule) {
                    return Err(BuildError::UnknownRule {
                        index: i,
                        rule: rule.index(),
                    });
                }
            }

            match &records[i] {
                Record::Entry { call, offset } => {
                    let rule = call.rule;

                    // A rule that matched nothing leaves no trace in the tree.
                    if !open.is_empty() && Self::exits_immediately(records, i, rule) {
                        i += 2;
                        continue;
                    }

                    if !self.grammar.is_transitional(rule) {
                        slots.push(Slot::Boundary(rule));
                    }
                    if let Some(name) = self.grammar.output_name(rule) {
                        slots.push(Slot::Name(name));
                    }
                    open.push(Open {
                        rule,
                        offset: *offset,
                    });
                }

                Record::Exit { call, .. } => {
                    let Some(entry) = open.pop() else {
                        return Err(BuildError::UnbalancedExit {
                            index: i,
                            rule: self.grammar.key(call.rule).to_string(),
                        });
                    };
                    if entry.rule != call.rule {
                        return Err(BuildError::MismatchedExit {
                            index: i,
                            expected: self.grammar.key(entry.rule).to_string(),
                            found: self.grammar.key(call.rule).to_string(),
                        });
                    }
                    if !self.grammar.is_transitional(entry.rule) {
                        self.reduce(&mut slots, &entry);
                    }
                }

                Record::Matched(lexeme) => {
                    if lexeme.kept {
                        let token = &lexeme.token;
                        slots.push(Slot::Node(
                            Leaf::new(&token.name, &token.value, token.offset).into(),
                        ));
                    }
                }
            }
            i += 1;
        }

        if let Some(entry) = open.pop() {
            return Err(BuildError::UnclosedRule {
                rule: self.grammar.key(entry.rule).to_string(),
            });
        }

        let mut nodes: Vec<Node> = slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Node(node) => Some(node),
                Slot::Boundary(_) | Slot::Name(_) => None,
            })
            .collect();

        match nodes.len() {
            0 => Err(BuildError::NoRoot),
            1 => Ok(nodes.remove(0)),
            count => Err(BuildError::AmbiguousRoot { count }),
        }
    }

    fn exits_immediately(records: &[Record], i: usize, rule: RuleId) -> bool {
        matches!(records.get(i + 1), Some(Record::Exit { call, .. }) if call.rule == rule)
    }

    /// Collapses everything above `entry`'s boundary into its node.
    ///
    /// Entries and exits are matched before this runs, so the topmost
    /// boundary is always `entry`'s own.
    fn reduce(&self, slots: &mut Vec<Slot<'g>>, entry: &Open) {
        let mut children = Vec::new();
        let mut discovered = None;

        while let Some(slot) = slots.pop() {
            match slot {
                Slot::Node(node) => children.push(node),
                Slot::Name(name) => {
                    discovered.get_or_insert(name);
                }
                Slot::Boundary(rule) => {
                    debug_assert_eq!(rule, entry.rule);
                    break;
                }
            }
        }
        children.reverse();

        match self.grammar.output_name(entry.rule).or(discovered) {
            Some(name) => slots.push(Slot::Node(
                RuleNode::new(name, children, entry.offset).into(),
            )),
            // Nothing to name the node after: hand the children to the parent.
            None => slots.extend(children.into_iter().map(Slot::Node)),
        }
    }
}
