//! Structural edits on an expression tree: removing and appending leaves,
//! wrapping runs of members in new groups, dissolving groups, swapping keys.
//!
//! All edits are in-place vector edits on the owning group's member list.
//! Fallible edits check their preconditions before mutating anything.

use std::collections::HashSet;

use super::{ExprTree, Group, Item, Member, Node, NodeId, Op};
use crate::error::{Error, Result};

impl ExprTree {
    /// Delete every leaf whose key is in `keys`, splicing each gap shut (the
    /// operator joining the predecessor to the new successor survives).
    ///
    /// Groups are normalized on the way out: an emptied group disappears
    /// from its parent, and a group left with one member collapses into that
    /// member, combining NOT flags by XOR so double negation cancels. A root
    /// reduced to a single group member absorbs that group's chain.
    pub fn remove(&mut self, keys: &[&str]) {
        let keys: HashSet<&str> = keys.iter().copied().collect();
        if keys.is_empty() {
            return;
        }
        self.remove_in_group(self.root_id(), &keys);

        let root_id = self.root_id();
        let only = match self.group_at(root_id).members.as_slice() {
            [only] => *only,
            _ => return,
        };
        if !matches!(self.node(only.node), Node::Group(_)) {
            return;
        }
        let (negated, inner) = match self.node_mut(only.node) {
            Node::Group(sub) => (sub.negated, std::mem::take(&mut sub.members)),
            Node::Item(_) => unreachable!(),
        };
        let root = self.group_at_mut(root_id);
        root.negated ^= negated;
        root.members = inner;
    }

    fn remove_in_group(&mut self, id: NodeId, keys: &HashSet<&str>) {
        let members = std::mem::take(&mut self.group_at_mut(id).members);
        let mut kept: Vec<Member> = Vec::with_capacity(members.len());

        for mut member in members {
            if let Node::Item(item) = self.node(member.node) {
                if !keys.contains(item.key.as_str()) {
                    kept.push(member);
                }
                continue;
            }

            self.remove_in_group(member.node, keys);
            let sub = self.group_at(member.node);
            if sub.members.is_empty() {
                continue;
            }
            if let [inner] = sub.members.as_slice() {
                // single-member group collapses into the member; the slot's
                // connecting operator stays put
                let inner = *inner;
                let sub_negated = sub.negated;
                match self.node_mut(inner.node) {
                    Node::Item(item) => item.negated ^= sub_negated,
                    Node::Group(group) => group.negated ^= sub_negated,
                }
                member.node = inner.node;
            }
            kept.push(member);
        }

        self.group_at_mut(id).members = kept;
    }

    /// Append single-key items at the end of the top-level chain, each
    /// AND-connected.
    pub fn add(&mut self, keys: &[&str]) {
        for key in keys {
            let node = self.alloc(Node::Item(Item {
                key: (*key).to_string(),
                negated: false,
            }));
            let root = self.group_at_mut(self.root_id());
            if let Some(last) = root.members.last_mut() {
                // the previous tail's op was padding; make the join explicit
                last.op = Op::And;
            }
            root.members.push(Member { node, op: Op::And });
        }
    }

    /// Reshape the tree's key set to `target`: leaves with keys absent from
    /// `target` are removed, keys new to the tree are appended as trailing
    /// AND conjuncts. Appending under a negated root would be ambiguous
    /// (inside or outside the negation?) and fails with
    /// [`Error::AmbiguousInsert`] before any mutation.
    pub fn set_keys(&mut self, target: &[&str]) -> Result<()> {
        let current = self.keys();
        let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
        let target_set: HashSet<&str> = target.iter().copied().collect();

        let mut seen = HashSet::new();
        let to_add: Vec<&str> = target
            .iter()
            .copied()
            .filter(|k| !current_set.contains(k) && seen.insert(*k))
            .collect();
        let to_remove: Vec<&str> = current
            .iter()
            .map(String::as_str)
            .filter(|k| !target_set.contains(k))
            .collect();

        if let Some(first) = to_add.first() {
            if self.group_at(self.root_id()).negated {
                return Err(Error::AmbiguousInsert((*first).to_string()));
            }
        }

        self.remove(&to_remove);
        self.add(&to_add);
        Ok(())
    }

    /// Wrap the run of members covering `keys` in a new sub-group, inside the
    /// smallest existing group whose key set contains all of `keys`. The run
    /// spans from the first to the last member intersecting `keys`; when it
    /// is the whole membership the group already provides the grouping and
    /// nothing changes.
    pub fn group(&mut self, keys: &[&str]) -> Result<()> {
        let keys: HashSet<&str> = keys.iter().copied().collect();
        if keys.is_empty() {
            return Ok(());
        }
        let host = self
            .find_enclosing(self.root_id(), &keys)
            .ok_or_else(|| Error::NoEnclosingGroup(display_keys(&keys)))?;

        let mut first = None;
        let mut last = None;
        for (i, member) in self.group_at(host).members.iter().enumerate() {
            if self.intersects(member.node, &keys) {
                first.get_or_insert(i);
                last = Some(i);
            }
        }
        let (Some(first), Some(last)) = (first, last) else {
            return Ok(());
        };
        if first == 0 && last + 1 == self.group_at(host).members.len() {
            return Ok(());
        }

        let mut run: Vec<Member> = self.group_at_mut(host).members.drain(first..=last).collect();
        let slot_op = run.last().map(|m| m.op).unwrap_or(Op::And);
        if let Some(tail) = run.last_mut() {
            tail.op = Op::And;
        }
        let sub = self.alloc(Node::Group(Group {
            negated: false,
            members: run,
        }));
        self.group_at_mut(host)
            .members
            .insert(first, Member { node: sub, op: slot_op });
        Ok(())
    }

    /// Dissolve the smallest group containing `keys`, splicing its members
    /// into the parent chain in its place. Fails on the root group
    /// ([`Error::RootGroup`]) and on a negated group ([`Error::NegatedGroup`],
    /// since dropping the negation would change the expression's meaning).
    pub fn break_group(&mut self, keys: &[&str]) -> Result<()> {
        let keys: HashSet<&str> = keys.iter().copied().collect();
        let target = self
            .find_enclosing(self.root_id(), &keys)
            .ok_or_else(|| Error::NoEnclosingGroup(display_keys(&keys)))?;
        if target == self.root_id() {
            return Err(Error::RootGroup);
        }
        if self.group_at(target).negated {
            return Err(Error::NegatedGroup);
        }
        let Some((parent, slot)) = self.locate(self.root_id(), target) else {
            return Err(Error::RootGroup);
        };

        let slot_op = self.group_at(parent).members[slot].op;
        let mut inner = std::mem::take(&mut self.group_at_mut(target).members);
        if let Some(tail) = inner.last_mut() {
            tail.op = slot_op;
        }
        let _ = self
            .group_at_mut(parent)
            .members
            .splice(slot..=slot, inner);
        Ok(())
    }

    /// Exchange the key labels of the leaves named `key1` and `key2`; their
    /// positions, NOT flags and connecting operators stay put. A no-op when
    /// either key is absent.
    pub fn swap(&mut self, key1: &str, key2: &str) {
        let Some(first) = self.find_item(self.root_id(), key1) else {
            return;
        };
        let Some(second) = self.find_item(self.root_id(), key2) else {
            return;
        };
        if first == second {
            return;
        }
        let first_key = match self.node(first) {
            Node::Item(item) => item.key.clone(),
            Node::Group(_) => unreachable!(),
        };
        let second_key = match self.node(second) {
            Node::Item(item) => item.key.clone(),
            Node::Group(_) => unreachable!(),
        };
        if let Node::Item(item) = self.node_mut(first) {
            item.key = second_key;
        }
        if let Node::Item(item) = self.node_mut(second) {
            item.key = first_key;
        }
    }

    /// The deepest, leftmost group whose key set contains all of `keys`.
    fn find_enclosing(&self, id: NodeId, keys: &HashSet<&str>) -> Option<NodeId> {
        let nested: Vec<NodeId> = self
            .group_at(id)
            .members
            .iter()
            .map(|m| m.node)
            .filter(|&n| matches!(self.node(n), Node::Group(_)))
            .collect();
        for child in nested {
            if let Some(found) = self.find_enclosing(child, keys) {
                return Some(found);
            }
        }
        let own: HashSet<String> = self.node_keys(id).into_iter().collect();
        keys.iter().all(|k| own.contains(*k)).then_some(id)
    }

    /// Parent group and member index of `target`, searching below `from`.
    fn locate(&self, from: NodeId, target: NodeId) -> Option<(NodeId, usize)> {
        for (i, member) in self.group_at(from).members.iter().enumerate() {
            if member.node == target {
                return Some((from, i));
            }
        }
        let nested: Vec<NodeId> = self
            .group_at(from)
            .members
            .iter()
            .map(|m| m.node)
            .filter(|&n| matches!(self.node(n), Node::Group(_)))
            .collect();
        for child in nested {
            if let Some(found) = self.locate(child, target) {
                return Some(found);
            }
        }
        None
    }

    fn intersects(&self, id: NodeId, keys: &HashSet<&str>) -> bool {
        match self.node(id) {
            Node::Item(item) => keys.contains(item.key.as_str()),
            Node::Group(group) => group
                .members
                .iter()
                .any(|m| self.intersects(m.node, keys)),
        }
    }

    fn find_item(&self, id: NodeId, key: &str) -> Option<NodeId> {
        match self.node(id) {
            Node::Item(item) => (item.key == key).then_some(id),
            Node::Group(group) => group
                .members
                .iter()
                .find_map(|m| self.find_item(m.node, key)),
        }
    }
}

fn display_keys(keys: &HashSet<&str>) -> String {
    let mut sorted: Vec<&str> = keys.iter().copied().collect();
    sorted.sort_unstable();
    sorted.join(", ")
}
