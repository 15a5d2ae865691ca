//! The matching network: construction and incremental token propagation.
//!
//! Fact insert/retract events enter at the bus node, fan out across the
//! alpha chains, and cascade depth-first through joins, negations, and
//! filters into per-rule conflict sets. Propagation is fully synchronous:
//! control returns to the caller only after the entire reachable subgraph
//! has seen the event.

use log::trace;

use retort_foundation::{Error, Fact, KeywordId, Result};

use crate::activation::Activation;
use crate::check::{AlphaCheck, alpha_checks, eval_predicate};
use crate::dnf::{BranchElem, normalize};
use crate::node::{ConflictEntry, Node, NodeId, NodeKind, PartialMatch, Port, TrackedToken};
use crate::pattern::{Condition, FactPattern};
use crate::token::Token;

/// The compiled RETE network for a set of rules.
///
/// Nodes live in an arena and are addressed by stable handles; each rule
/// owns one terminal node whose memory is its live conflict set. Rules are
/// wired before facts flow: a rule added later only sees facts declared
/// after it.
pub struct ReteNetwork {
    nodes: Vec<Node>,
    bus: NodeId,
    /// Terminal nodes in rule-registration order.
    terminals: Vec<(KeywordId, NodeId)>,
}

impl Default for ReteNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl ReteNetwork {
    /// Creates an empty network containing only the bus node.
    #[must_use]
    pub fn new() -> Self {
        let bus = Node::new(NodeKind::Bus);
        Self {
            nodes: vec![bus],
            bus: NodeId(0),
            terminals: Vec::new(),
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Compiles a rule condition and wires it into the network.
    ///
    /// The condition is rewritten to disjunctive normal form, validated,
    /// and only then wired; a failing rule leaves no partial network
    /// behind. `rule_name` is used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns a compilation error for duplicate rule names, unsupported
    /// constructs, or tests over unbound variables.
    pub fn add_production(
        &mut self,
        rule: KeywordId,
        rule_name: &str,
        condition: Condition,
    ) -> Result<()> {
        if self.terminals.iter().any(|(r, _)| *r == rule) {
            return Err(Error::duplicate_rule(rule_name));
        }

        let branches = normalize(rule_name, condition)?;

        let terminal = self.push(NodeKind::Terminal {
            rule,
            memory: Vec::new(),
        });
        for (index, branch) in branches.iter().enumerate() {
            let index = u32::try_from(index).expect("too many branches");
            self.wire_branch(terminal, index, branch)?;
        }
        self.terminals.push((rule, terminal));

        trace!(
            "wired rule {rule_name}: {} branch(es), {} nodes total",
            branches.len(),
            self.nodes.len()
        );
        Ok(())
    }

    /// Wires one conjunctive branch as a left-fold of two-input nodes.
    fn wire_branch(&mut self, terminal: NodeId, branch: u32, elems: &[BranchElem]) -> Result<()> {
        let Some(BranchElem::Pattern(first)) = elems.first() else {
            // normalize() anchors every branch on a positive pattern.
            return Err(Error::internal(
                "branch does not open with a positive pattern",
            ));
        };

        let mut current = self.wire_alpha(first);
        for elem in &elems[1..] {
            current = match elem {
                BranchElem::Pattern(pattern) => {
                    let right = self.wire_alpha(pattern);
                    let join = self.push(NodeKind::Join {
                        left: Vec::new(),
                        right: Vec::new(),
                    });
                    self.link(current, join, Port::Left);
                    self.link(right, join, Port::Right);
                    join
                }
                BranchElem::Negated(pattern) => {
                    let right = self.wire_alpha(pattern);
                    let not = self.push(NodeKind::Not {
                        left: Vec::new(),
                        right: Vec::new(),
                    });
                    self.link(current, not, Port::Left);
                    self.link(right, not, Port::Right);
                    not
                }
                BranchElem::Test(pred) => {
                    let filter = self.push(NodeKind::Filter(pred.clone()));
                    self.link(current, filter, Port::Single);
                    filter
                }
            };
        }
        self.link(current, terminal, Port::Branch(branch));
        Ok(())
    }

    /// Wires the alpha chain for one pattern, sharing structurally equal
    /// check nodes with previously wired chains (build-or-share).
    fn wire_alpha(&mut self, pattern: &FactPattern) -> NodeId {
        let mut current = self.bus;
        for check in alpha_checks(pattern) {
            current = self.child_check(current, check);
        }
        current
    }

    fn child_check(&mut self, parent: NodeId, check: AlphaCheck) -> NodeId {
        for (child, port) in &self.nodes[parent.0].links {
            if *port != Port::Single {
                continue;
            }
            if let NodeKind::Check(existing) = &self.nodes[child.0].kind {
                if *existing == check {
                    return *child;
                }
            }
        }
        let id = self.push(NodeKind::Check(check));
        self.link(parent, id, Port::Single);
        id
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    fn link(&mut self, from: NodeId, to: NodeId, port: Port) {
        self.nodes[from.0].links.push((to, port));
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// Feeds a fact-insertion event into the network.
    ///
    /// # Errors
    ///
    /// Propagates fail-fast invariant violations (context-merge conflicts).
    pub fn declare(&mut self, fact: &Fact) -> Result<()> {
        trace!("declare {fact:?}");
        let token = Token::valid(fact.clone());
        self.fire(self.bus, Port::Single, &token)
    }

    /// Feeds a fact-retraction event into the network.
    ///
    /// # Errors
    ///
    /// Propagates fail-fast invariant violations (context-merge conflicts).
    pub fn retract(&mut self, fact: &Fact) -> Result<()> {
        trace!("retract {fact:?}");
        let token = Token::invalid(fact.clone());
        self.fire(self.bus, Port::Single, &token)
    }

    /// Delivers a token to one node input and cascades the node's outputs
    /// depth-first through its successors.
    fn fire(&mut self, id: NodeId, port: Port, token: &Token) -> Result<()> {
        let node = &mut self.nodes[id.0];
        let outputs: Vec<Token> = match (&mut node.kind, port) {
            (NodeKind::Bus, Port::Single) => vec![token.clone()],

            (NodeKind::Check(check), Port::Single) => {
                let fact = single_fact(token)?;
                check.apply(token, fact).into_iter().collect()
            }

            (NodeKind::Filter(pred), Port::Single) => {
                if eval_predicate(pred, None, &token.context) {
                    vec![token.clone()]
                } else {
                    Vec::new()
                }
            }

            (NodeKind::Join { left, right }, Port::Left) => {
                update_join_memory(left, token);
                join_against(token, right)?
            }

            (NodeKind::Join { left, right }, Port::Right) => {
                update_join_memory(right, token);
                join_against(token, left)?
            }

            (NodeKind::Not { left, right }, Port::Left) => {
                let blockers = right
                    .iter()
                    .filter(|entry| token.context.consistent_with(&entry.context))
                    .count();

                if token.is_valid() {
                    left.push(TrackedToken {
                        token: token.clone(),
                        blockers,
                    });
                } else {
                    // Drop the stale tracking entry; invalid left tokens
                    // are never tracked.
                    let payload = PartialMatch::of(token);
                    if let Some(pos) = left
                        .iter()
                        .position(|t| PartialMatch::of(&t.token) == payload)
                    {
                        left.remove(pos);
                    }
                }

                // Nothing blocks the combination: let it through with its
                // own tag. Blocked tokens produce no downstream event.
                if blockers == 0 {
                    vec![token.clone()]
                } else {
                    Vec::new()
                }
            }

            (NodeKind::Not { left, right }, Port::Right) => {
                negate_right(left, right, token)
            }

            (NodeKind::Terminal { memory, .. }, Port::Branch(branch)) => {
                let entry = ConflictEntry {
                    branch,
                    facts: token.facts.clone(),
                    context: token.context.clone(),
                };
                if token.is_valid() {
                    // Idempotent: one entry per (branch, facts, context).
                    if !memory.contains(&entry) {
                        memory.push(entry);
                    }
                } else if let Some(pos) = memory.iter().position(|e| *e == entry) {
                    // Unknown retractions are a tolerated no-op: negation
                    // and OR sub-networks generate speculative invalid
                    // tokens.
                    memory.remove(pos);
                }
                Vec::new()
            }

            (_, port) => {
                return Err(Error::internal(format!(
                    "token delivered to incompatible port {port:?}"
                )));
            }
        };

        if outputs.is_empty() {
            return Ok(());
        }

        let links = self.nodes[id.0].links.clone();
        for output in &outputs {
            for (child, port) in &links {
                self.fire(*child, *port, output)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Materializes every rule's live conflict set, in rule-registration
    /// order, entries in insertion order.
    #[must_use]
    pub fn activations(&self) -> Vec<Activation> {
        self.terminals
            .iter()
            .flat_map(|&(rule, id)| self.terminal_activations(rule, id))
            .collect()
    }

    /// Materializes one rule's live conflict set.
    #[must_use]
    pub fn activations_of(&self, rule: KeywordId) -> Vec<Activation> {
        self.terminals
            .iter()
            .find(|(r, _)| *r == rule)
            .map(|&(rule, id)| self.terminal_activations(rule, id))
            .unwrap_or_default()
    }

    fn terminal_activations(&self, rule: KeywordId, id: NodeId) -> Vec<Activation> {
        let NodeKind::Terminal { memory, .. } = &self.nodes[id.0].kind else {
            return Vec::new();
        };
        memory
            .iter()
            .map(|entry| {
                let mut facts: Vec<Fact> = entry.facts.iter().cloned().collect();
                facts.sort_by_key(Fact::id);
                Activation {
                    rule,
                    branch: entry.branch,
                    facts,
                    context: entry.context.clone(),
                }
            })
            .collect()
    }

    /// Clears every node memory, walking the children graph depth-first
    /// from the bus. Wiring is preserved.
    pub fn reset(&mut self) {
        trace!("reset network");
        let mut visited = vec![false; self.nodes.len()];
        self.clear_from(self.bus, &mut visited);
    }

    fn clear_from(&mut self, id: NodeId, visited: &mut [bool]) {
        if visited[id.0] {
            return;
        }
        visited[id.0] = true;
        self.nodes[id.0].clear_memory();
        let links = self.nodes[id.0].links.clone();
        for (child, _) in links {
            self.clear_from(child, visited);
        }
    }

    /// Number of nodes in the arena (diagnostic).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Per-node memory entry counts, in arena order (diagnostic).
    ///
    /// Useful for asserting that a declare immediately followed by the
    /// matching retract restores every memory exactly.
    #[must_use]
    pub fn memory_sizes(&self) -> Vec<usize> {
        self.nodes.iter().map(Node::memory_len).collect()
    }
}

/// Records or removes a partial match in one side of a join memory.
/// Removal of an untracked entry is tolerated (§ error policy): invalid
/// tokens can legitimately arrive for combinations that never matched.
fn update_join_memory(memory: &mut Vec<PartialMatch>, token: &Token) {
    let entry = PartialMatch::of(token);
    if token.is_valid() {
        memory.push(entry);
    } else if let Some(pos) = memory.iter().position(|e| *e == entry) {
        memory.remove(pos);
    }
}

/// Joins an incoming token against the opposite memory, producing one
/// combined token per context-consistent entry.
fn join_against(token: &Token, opposite: &[PartialMatch]) -> Result<Vec<Token>> {
    let mut outputs = Vec::new();
    for entry in opposite {
        if token.context.consistent_with(&entry.context) {
            outputs.push(token.combine(&entry.facts, &entry.context)?);
        }
    }
    Ok(outputs)
}

/// Right-side activation of a negation node: adjust blocker counts and
/// emit tokens for the 0↔1 transitions.
fn negate_right(
    left: &mut [TrackedToken],
    right: &mut Vec<PartialMatch>,
    token: &Token,
) -> Vec<Token> {
    let entry = PartialMatch::of(token);
    let delta: i64 = if token.is_valid() {
        right.push(entry);
        1
    } else if let Some(pos) = right.iter().position(|e| *e == entry) {
        right.remove(pos);
        -1
    } else {
        // Untracked removal: memory unchanged, counts must not move.
        0
    };

    let mut outputs = Vec::new();
    if delta == 0 {
        return outputs;
    }

    for tracked in left.iter_mut() {
        if !tracked.token.context.consistent_with(&token.context) {
            continue;
        }
        let before = tracked.blockers;
        if delta > 0 {
            tracked.blockers += 1;
        } else {
            tracked.blockers = tracked.blockers.saturating_sub(1);
        }
        if before == 0 && tracked.blockers == 1 {
            // A blocker just appeared: retract downstream.
            outputs.push(tracked.token.invalidated());
        } else if before == 1 && tracked.blockers == 0 {
            // The last blocker disappeared: assert downstream.
            outputs.push(tracked.token.clone());
        }
    }
    outputs
}

/// Alpha-stage invariant: tokens upstream of any join carry exactly one
/// fact.
fn single_fact(token: &Token) -> Result<&Fact> {
    if token.facts.len() != 1 {
        return Err(Error::internal("multi-fact token in the alpha network"));
    }
    token
        .facts
        .iter()
        .next()
        .ok_or_else(|| Error::internal("empty token in the alpha network"))
}
