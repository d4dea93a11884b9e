//! The concrete syntax tree produced by the [`builder`](crate::builder).
//!
//! Trees are plain owned values: each node owns its children and nothing is
//! mutated after construction.

use std::fmt;

/// A node of the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A named group of children.
    Rule(RuleNode),
    /// A kept token.
    Leaf(Leaf),
}

/// A rule node: a name and its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    /// The rule's output name.
    pub name: String,
    /// Children in source order.
    pub children: Vec<Node>,
    /// Offset at which the rule started matching.
    pub offset: usize,
}

/// A leaf node: a single kept token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Token name.
    pub name: String,
    /// Token text.
    pub value: String,
    /// Token offset.
    pub offset: usize,
}

impl RuleNode {
    /// Creates a rule node.
    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<Node>, offset: usize) -> Self {
        Self {
            name: name.into(),
            children,
            offset,
        }
    }
}

impl Leaf {
    /// Creates a leaf.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            offset,
        }
    }
}

impl Node {
    /// Rule name or token name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::Rule(rule) => &rule.name,
            Node::Leaf(leaf) => &leaf.name,
        }
    }

    /// Offset of the node's first token.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Node::Rule(rule) => rule.offset,
            Node::Leaf(leaf) => leaf.offset,
        }
    }

    /// Children of a rule; empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Rule(rule) => &rule.children,
            Node::Leaf(_) => &[],
        }
    }

    /// The `index`-th child, if any.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    /// Token text of a leaf.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Node::Rule(_) => None,
            Node::Leaf(leaf) => Some(&leaf.value),
        }
    }

    /// Concatenated text of every leaf under this node.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Node::Leaf(leaf) => leaf.value.clone(),
            Node::Rule(rule) => rule.children.iter().map(Node::text).collect(),
        }
    }

    /// Returns `true` for leaves.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of nested rule levels in the tree rooted here; leaves add none.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Rule(rule) => 1 + rule.children.iter().map(Node::depth).max().unwrap_or(0),
        }
    }

    /// Every node named `name`, in pre-order, including this one.
    ///
    /// With `max_depth`, only nodes at most that many levels below this one
    /// are considered (this node is at depth 0).
    #[must_use]
    pub fn find(&self, name: &str, max_depth: Option<usize>) -> Vec<&Node> {
        let mut found = Vec::new();
        let mut stack = vec![(self, 0)];

        while let Some((node, depth)) = stack.pop() {
            if node.name() == name {
                found.push(node);
            }
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            stack.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
        }

        found
    }

    /// The first node named `name` in pre-order, see [`Node::find`].
    #[must_use]
    pub fn first(&self, name: &str, max_depth: Option<usize>) -> Option<&Node> {
        self.find(name, max_depth).into_iter().next()
    }

    fn dump(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        f.write_str(&">  ".repeat(depth + 1))?;
        match self {
            Node::Leaf(leaf) => write!(f, "token({}, {})", leaf.name, leaf.value),
            Node::Rule(rule) => {
                f.write_str(&rule.name)?;
                for child in &rule.children {
                    writeln!(f)?;
                    child.dump(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f, 0)
    }
}

impl From<RuleNode> for Node {
    fn from(rule: RuleNode) -> Self {
        Node::Rule(rule)
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}
