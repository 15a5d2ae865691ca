//! Node arena types for the matching network.
//!
//! Nodes live in a flat arena addressed by [`NodeId`] handles; each node
//! owns its memory exclusively and records its successors as
//! `(NodeId, Port)` pairs, the port selecting which activation method the
//! token arrives through. Handles sidestep the ownership cycles a directly
//! linked mutable graph would create.

use std::fmt;

use retort_foundation::{Fact, KeywordId, RtSet};

use crate::check::AlphaCheck;
use crate::pattern::Predicate;
use crate::token::{Context, Token};

/// Stable handle of a node in the network arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Which input of a node a token arrives on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    /// The only input of a single-input node (bus, check, filter).
    Single,
    /// Left input of a join or negation node (partial-match stream).
    Left,
    /// Right input of a join or negation node (alpha stream).
    Right,
    /// Terminal input, tagged with the disjunct that produced the match.
    Branch(u32),
}

/// A partial match stored in a beta memory: the frozen fact tuple plus the
/// frozen binding context of a token that passed through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialMatch {
    /// Contributing facts.
    pub facts: RtSet<Fact>,
    /// Accumulated bindings.
    pub context: Context,
}

impl PartialMatch {
    /// Freezes a token's payload.
    #[must_use]
    pub fn of(token: &Token) -> Self {
        Self {
            facts: token.facts.clone(),
            context: token.context.clone(),
        }
    }
}

/// A left entry tracked by a negation node: the token in its valid form
/// plus the live count of right entries currently blocking it.
#[derive(Clone, Debug)]
pub struct TrackedToken {
    /// The valid form of the left token, re-emitted on count transitions.
    pub token: Token,
    /// Number of context-consistent right entries.
    pub blockers: usize,
}

/// One complete match held by a terminal node.
///
/// The branch index is part of the entry's identity: distinct disjuncts of
/// one rule count independently even when they derive the same fact tuple
/// and context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictEntry {
    /// Which disjunct produced the match.
    pub branch: u32,
    /// Contributing facts.
    pub facts: RtSet<Fact>,
    /// Final bindings.
    pub context: Context,
}

/// Node behavior plus its memory.
pub(crate) enum NodeKind {
    /// Fan-out entry point converting fact events into tokens.
    Bus,
    /// Stateless single-fact test (alpha network).
    Check(AlphaCheck),
    /// Stateless boolean test over the token context (beta stage).
    Filter(Predicate),
    /// Two-input join combining consistent partial matches.
    Join {
        /// Live partial matches seen on the left input.
        left: Vec<PartialMatch>,
        /// Live partial matches seen on the right input.
        right: Vec<PartialMatch>,
    },
    /// Negation-as-failure with live blocker counts.
    Not {
        /// Tracked left tokens keyed by payload, with blocker counts.
        left: Vec<TrackedToken>,
        /// Live partial matches seen on the right input.
        right: Vec<PartialMatch>,
    },
    /// Per-rule conflict set.
    Terminal {
        /// The rule this conflict set belongs to.
        rule: KeywordId,
        /// Complete matches in insertion order.
        memory: Vec<ConflictEntry>,
    },
}

/// One node of the network: behavior, memory, and successor links.
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    /// Successors, each with the port tokens are delivered to.
    pub(crate) links: Vec<(NodeId, Port)>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            links: Vec::new(),
        }
    }

    /// Drops all partial matches and conflict entries; wiring is kept.
    pub(crate) fn clear_memory(&mut self) {
        match &mut self.kind {
            NodeKind::Bus | NodeKind::Check(_) | NodeKind::Filter(_) => {}
            NodeKind::Join { left, right } => {
                left.clear();
                right.clear();
            }
            NodeKind::Not { left, right } => {
                left.clear();
                right.clear();
            }
            NodeKind::Terminal { memory, .. } => memory.clear(),
        }
    }

    /// Number of entries held across this node's memories (diagnostic).
    pub(crate) fn memory_len(&self) -> usize {
        match &self.kind {
            NodeKind::Bus | NodeKind::Check(_) | NodeKind::Filter(_) => 0,
            NodeKind::Join { left, right } => left.len() + right.len(),
            NodeKind::Not { left, right } => left.len() + right.len(),
            NodeKind::Terminal { memory, .. } => memory.len(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Bus => "bus".to_string(),
            NodeKind::Check(check) => format!("check {check:?}"),
            NodeKind::Filter(pred) => format!("filter {pred:?}"),
            NodeKind::Join { left, right } => {
                format!("join [{}|{}]", left.len(), right.len())
            }
            NodeKind::Not { left, right } => {
                format!("not [{}|{}]", left.len(), right.len())
            }
            NodeKind::Terminal { rule, memory } => {
                format!("terminal {rule:?} [{}]", memory.len())
            }
        };
        write!(f, "Node({kind}, {} links)", self.links.len())
    }
}
