//! Expression tree for human-readable boolean predicates.
//!
//! An expression like `!(A&&(!B)&&(C||D))` parses into a tree of named
//! conditions (`Item`) and parenthesized sub-expressions (`Group`). The tree
//! is an arena: nodes live in a flat vector and refer to each other by index,
//! and each group holds an ordered member list instead of linked `next`
//! pointers, so structural edits are plain vector edits.

mod disambiguate;
mod edit;
mod parser;
mod project;

use std::fmt;

/// Index of a node in an [`ExprTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// Binary connective joining two adjacent group members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
}

impl Op {
    /// And binds tighter than Or; these are the only two priority levels.
    pub(crate) fn priority(self) -> u8 {
        match self {
            Op::And => 10,
            Op::Or => 0,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Op::And => "&&",
            Op::Or => "||",
        }
    }
}

/// Atomic named condition, optionally negated: `foo` or `!foo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub key: String,
    pub negated: bool,
}

/// One slot in a group's member list. `op` joins this member to its
/// successor and is ignored on the last member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Member {
    pub(crate) node: NodeId,
    pub(crate) op: Op,
}

/// Parenthesized sub-expression: an ordered member list plus a NOT flag
/// covering the whole group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub negated: bool,
    pub(crate) members: Vec<Member>,
}

impl Group {
    /// Member nodes paired with the operator joining each to its successor;
    /// the last pair's operator is padding.
    pub fn members(&self) -> impl Iterator<Item = (NodeId, Op)> + '_ {
        self.members.iter().map(|m| (m.node, m.op))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A tree node — matched exhaustively everywhere the two kinds differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Item(Item),
    Group(Group),
}

/// Arena-backed expression tree. The root is always a group; only the root
/// group may be empty (the empty expression).
#[derive(Debug, Clone)]
pub struct ExprTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ExprTree {
    /// The empty expression.
    pub fn new() -> Self {
        ExprTree {
            nodes: vec![Node::Group(Group::default())],
            root: NodeId(0),
        }
    }

    /// Whether the tree has any members at all.
    pub fn is_empty(&self) -> bool {
        self.group_at(self.root).members.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Id of the root group.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    pub(crate) fn group_at(&self, id: NodeId) -> &Group {
        match self.node(id) {
            Node::Group(group) => group,
            Node::Item(_) => unreachable!("group id points at an item"),
        }
    }

    pub(crate) fn group_at_mut(&mut self, id: NodeId) -> &mut Group {
        match self.node_mut(id) {
            Node::Group(group) => group,
            Node::Item(_) => unreachable!("group id points at an item"),
        }
    }

    /// All leaf keys, in left-to-right depth-first order.
    pub fn keys(&self) -> Vec<String> {
        self.node_keys(self.root)
    }

    pub(crate) fn node_keys(&self, id: NodeId) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_keys(id, &mut out);
        out
    }

    fn collect_keys(&self, id: NodeId, out: &mut Vec<String>) {
        match self.node(id) {
            Node::Item(item) => out.push(item.key.clone()),
            Node::Group(group) => {
                for member in &group.members {
                    self.collect_keys(member.node, out);
                }
            }
        }
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node(id) {
            Node::Item(item) => {
                if item.negated {
                    f.write_str("!")?;
                }
                f.write_str(&item.key)
            }
            Node::Group(group) => {
                if group.members.is_empty() {
                    return Ok(());
                }
                if group.negated {
                    f.write_str("!")?;
                }
                f.write_str("(")?;
                for (i, member) in group.members.iter().enumerate() {
                    self.fmt_node(member.node, f)?;
                    if i + 1 < group.members.len() {
                        f.write_str(member.op.as_str())?;
                    }
                }
                f.write_str(")")
            }
        }
    }
}

impl Default for ExprTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the canonical form: every group explicitly parenthesized,
/// operators spelled `&&`/`||`. Canonical strings parse back to an
/// identical tree.
impl fmt::Display for ExprTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

impl std::str::FromStr for ExprTree {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExprTree::parse(s)
    }
}
