//! Activations: complete matches exposed to the agenda.

use std::hash::{Hash, Hasher};

use retort_foundation::{Fact, FactId, KeywordId};

use crate::token::Context;

/// A complete match of one rule: the fact tuple that satisfied it and the
/// variable bindings accumulated along the way.
///
/// Produced and destroyed only by terminal nodes; never mutated.
#[derive(Clone, Debug)]
pub struct Activation {
    /// The matched rule.
    pub rule: KeywordId,
    /// Index of the disjunct that produced the match. Part of the
    /// activation's identity: an OR of three negations yields three
    /// activations distinguished only by this index.
    pub branch: u32,
    /// Contributing facts, sorted by id (most recent last).
    pub facts: Vec<Fact>,
    /// Final variable bindings.
    pub context: Context,
}

impl Activation {
    /// Returns the most recent fact id in the tuple.
    ///
    /// Drives recency ordering during conflict resolution. The implicit
    /// initial fact is declared first on reset, so matches carrying later
    /// facts always outrank pure initial-fact matches.
    #[must_use]
    pub fn recency(&self) -> Option<FactId> {
        self.facts.iter().filter_map(Fact::id).max()
    }

    /// Computes a stable identity hash for refraction bookkeeping.
    ///
    /// Two activations with the same rule, branch, fact ids, and context
    /// produce the same key.
    #[must_use]
    pub fn key(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        self.rule.hash(&mut hasher);
        self.branch.hash(&mut hasher);
        for fact in &self.facts {
            fact.id().hash(&mut hasher);
        }
        self.context.hash(&mut hasher);
        hasher.finish()
    }
}
