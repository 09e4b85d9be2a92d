//! Precedence disambiguation: rewrite flat mixed-operator chains into
//! explicit nesting, so `a&&b||c` becomes `(a&&b)||c`.

use super::{ExprTree, Group, Member, Node, NodeId, Op};

impl ExprTree {
    /// Make And-over-Or precedence explicit by wrapping every maximal And-run
    /// of a mixed chain in its own synthetic group. Works post-order (nested
    /// groups first), mutates in place, and is idempotent: after one pass
    /// every member chain carries a single operator.
    pub fn disambiguate(&mut self) {
        self.disambiguate_group(self.root_id());
    }

    fn disambiguate_group(&mut self, id: NodeId) {
        let nested: Vec<NodeId> = self
            .group_at(id)
            .members
            .iter()
            .map(|m| m.node)
            .filter(|&n| matches!(self.node(n), Node::Group(_)))
            .collect();
        for child in nested {
            self.disambiguate_group(child);
        }

        let members = &self.group_at(id).members;
        if members.len() < 2 {
            return;
        }
        // Operators joining the members; the last slot's op is padding.
        let connecting = &members[..members.len() - 1];
        if connecting
            .iter()
            .all(|m| m.op.priority() == connecting[0].op.priority())
        {
            return;
        }

        // Two priority levels only, so rebracketing reduces to splitting the
        // chain at Or boundaries and wrapping each multi-member And-run.
        let old = std::mem::take(&mut self.group_at_mut(id).members);
        let mut rebuilt: Vec<Member> = Vec::new();
        let mut run: Vec<Member> = Vec::new();
        for (i, member) in old.iter().enumerate() {
            run.push(*member);
            let closes_run = i + 1 == old.len() || member.op == Op::Or;
            if !closes_run {
                continue;
            }
            if run.len() == 1 {
                let mut only = run.remove(0);
                only.op = Op::Or;
                rebuilt.push(only);
            } else {
                let mut inner = std::mem::take(&mut run);
                if let Some(last) = inner.last_mut() {
                    last.op = Op::And;
                }
                let sub = self.alloc(Node::Group(Group {
                    negated: false,
                    members: inner,
                }));
                rebuilt.push(Member {
                    node: sub,
                    op: Op::Or,
                });
            }
        }
        self.group_at_mut(id).members = rebuilt;
    }
}
