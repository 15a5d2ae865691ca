//! Conflict resolution and refraction.
//!
//! The agenda orders the live conflict set for firing: higher salience
//! first, then more recent fact tuples. Refraction keeps an activation
//! from firing twice while it remains continuously active; an activation
//! that leaves the conflict set and re-derives is re-armed and may fire
//! again.

use std::collections::HashSet;

use retort_foundation::KeywordId;
use retort_rete::Activation;

/// Orders activations for firing and tracks refraction state.
#[derive(Debug, Default)]
pub struct Agenda {
    /// Identity keys of activations that already fired and are still live.
    executed: HashSet<u64>,
}

impl Agenda {
    /// Creates an empty agenda.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the firing order from the current conflict set.
    ///
    /// Drops refracted activations, re-arms refraction entries whose
    /// activation has left the conflict set, and sorts the remainder by
    /// salience (descending) then fact recency (descending). Ties keep
    /// conflict-set order, so rule registration order breaks them.
    pub fn select(
        &mut self,
        conflict_set: Vec<Activation>,
        salience: impl Fn(KeywordId) -> i32,
    ) -> Vec<Activation> {
        let live: HashSet<u64> = conflict_set.iter().map(Activation::key).collect();
        self.executed.retain(|key| live.contains(key));

        let mut pending: Vec<Activation> = conflict_set
            .into_iter()
            .filter(|activation| !self.executed.contains(&activation.key()))
            .collect();

        pending.sort_by(|a, b| {
            salience(b.rule)
                .cmp(&salience(a.rule))
                .then_with(|| b.recency().cmp(&a.recency()))
        });
        pending
    }

    /// Records that an activation fired.
    pub fn mark_executed(&mut self, activation: &Activation) {
        self.executed.insert(activation.key());
    }

    /// Forgets all refraction state.
    pub fn clear(&mut self) {
        self.executed.clear();
    }
}
