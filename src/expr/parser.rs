//! Infix predicate parser.
//!
//! Grammar:
//!   Expr       = ['!'] '(' Expr (Operator Expr)* ')' | ['!'] Identifier
//!   Operator   = "&&" | "||" (single `&` / `|` accepted as equivalents)
//!   Identifier = any maximal run of characters excluding `&`, `|`, `(`, `)`
//!
//! No whitespace trimming anywhere: spaces are identifier characters.
//!
//! Parsing works bottom-up: the leftmost innermost parenthesized substring
//! (optionally prefixed by `!`) is parsed into a group, replaced in the text
//! by a numbered `$N` placeholder, and recorded in a placeholder table scoped
//! to the one top-level call; once no parentheses remain, the flat remainder
//! is split on operators and each operand resolves to a placeholder's group
//! or a fresh item.

use std::sync::LazyLock;

use regex::Regex;

use super::{ExprTree, Group, Item, Member, Node, NodeId, Op};
use crate::error::{Error, Result};

/// An innermost parenthesized run: no nested parentheses inside.
static INNER_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!?\([^()]*\)").unwrap());

static OPERATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&&?|\|\|?").unwrap());

/// Maximum grouping depth; bounds recursion in every tree walk downstream.
const MAX_DEPTH: usize = 64;

impl ExprTree {
    /// Parse an infix predicate string. Empty input yields the empty tree;
    /// malformed input (unbalanced parentheses, empty groups, dangling
    /// operators) is rejected with [`Error::Syntax`].
    pub fn parse(input: &str) -> Result<ExprTree> {
        if input.is_empty() {
            return Ok(ExprTree::new());
        }
        validate(input)?;

        let mut tree = ExprTree::new();
        let mut placeholders = Vec::new();
        let root = parse_group(&mut tree, input, &mut placeholders)?;
        tree.set_root(root);
        Ok(tree)
    }
}

/// Balance and adjacency checks over the raw input. Operands are either
/// identifiers or parenthesized groups, so a group must be preceded and
/// followed by an operator (or another paren / leading `!`).
fn validate(input: &str) -> Result<()> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => {
                // a group (with any chain of leading bangs) must start an
                // operand: begin the input or follow an operator or `(`
                let mut j = i;
                while j > 0 && bytes[j - 1] == b'!' {
                    j -= 1;
                }
                if j > 0 && !matches!(bytes[j - 1], b'&' | b'|' | b'(') {
                    return Err(Error::Syntax(format!(
                        "missing operator before group at byte {i}"
                    )));
                }
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(Error::Syntax(format!(
                        "grouping deeper than {MAX_DEPTH} levels"
                    )));
                }
            }
            b')' => {
                if depth == 0 {
                    return Err(Error::Syntax("unbalanced parentheses".into()));
                }
                depth -= 1;
                if bytes[i - 1] == b'(' {
                    return Err(Error::Syntax("empty group \"()\"".into()));
                }
                if i + 1 < bytes.len() && !matches!(bytes[i + 1], b'&' | b'|' | b')') {
                    return Err(Error::Syntax(format!(
                        "missing operator after group at byte {i}"
                    )));
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::Syntax("unbalanced parentheses".into()));
    }
    Ok(())
}

/// True when the string is one parenthesized group: the opening paren's
/// matching close is the final character.
fn wrapped_in_parens(s: &str) -> bool {
    if !s.starts_with('(') {
        return false;
    }
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

fn parse_group(
    tree: &mut ExprTree,
    input: &str,
    placeholders: &mut Vec<NodeId>,
) -> Result<NodeId> {
    let mut group = Group::default();
    let mut s = input;

    // A leading bang negates the whole group only when it prefixes one fully
    // parenthesized expression; `!a&&b` keeps the bang on the first operand.
    if let Some(rest) = s.strip_prefix('!') {
        if wrapped_in_parens(rest) {
            group.negated = true;
            s = rest;
        }
    }
    if wrapped_in_parens(s) {
        s = &s[1..s.len() - 1];
    }

    // Extract innermost sub-groups into placeholders until the text is flat.
    let mut s = s.to_string();
    while let Some(found) = INNER_GROUP.find(&s) {
        let range = found.range();
        let id = parse_group(tree, found.as_str(), placeholders)?;
        let token = format!("${}", placeholders.len());
        placeholders.push(id);
        s.replace_range(range, &token);
    }

    // Split the flat remainder on operators, keeping them.
    let mut operands: Vec<&str> = Vec::new();
    let mut ops: Vec<Op> = Vec::new();
    let mut last = 0;
    for m in OPERATOR.find_iter(&s) {
        operands.push(&s[last..m.start()]);
        ops.push(match m.as_str() {
            "&&" | "&" => Op::And,
            _ => Op::Or,
        });
        last = m.end();
    }
    operands.push(&s[last..]);

    let mut members = Vec::with_capacity(operands.len());
    for (i, token) in operands.iter().enumerate() {
        let node = resolve_operand(tree, token, placeholders)?;
        let op = ops.get(i).copied().unwrap_or(Op::And);
        members.push(Member { node, op });
    }
    group.members = members;

    Ok(tree.alloc(Node::Group(group)))
}

/// Resolve one flat token: a `$N` placeholder refers back to an extracted
/// group; anything else is a named condition. A single leading `!` negates
/// either one.
fn resolve_operand(
    tree: &mut ExprTree,
    token: &str,
    placeholders: &[NodeId],
) -> Result<NodeId> {
    let (negated, body) = match token.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if body.is_empty() {
        return Err(Error::Syntax(format!("missing operand near {token:?}")));
    }

    if let Some(digits) = body.strip_prefix('$') {
        if let Ok(index) = digits.parse::<usize>() {
            if let Some(&id) = placeholders.get(index) {
                if negated {
                    // `!!(…)`: the outer bang lands on the group
                    match tree.node_mut(id) {
                        Node::Group(sub) => sub.negated ^= true,
                        Node::Item(_) => unreachable!("placeholder points at an item"),
                    }
                }
                return Ok(id);
            }
        }
    }

    Ok(tree.alloc(Node::Item(Item {
        key: body.to_string(),
        negated,
    })))
}
