//! Indexed fact storage with duplicate detection.
//!
//! The fact list owns the facts the engine knows about and assigns their
//! identifiers. The matching network never stores or destroys facts; it
//! only reacts to the insert/retract events the engine derives from this
//! list.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use retort_foundation::{Error, Fact, FactId, Result};

/// Indexed collection of declared facts.
///
/// Identifiers are monotonically increasing and never reused; recency
/// ordering on ids drives conflict resolution. Declaring a structural
/// duplicate is a no-op signaled by `None`.
#[derive(Debug, Default)]
pub struct FactList {
    /// Facts by id, iterated in declaration order.
    by_id: BTreeMap<FactId, Fact>,
    /// Structural index for duplicate detection (fact equality ignores
    /// the id).
    by_content: HashMap<Fact, FactId>,
    /// Next id to assign.
    next: u64,
}

impl FactList {
    /// Creates an empty fact list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a fact, assigning it the next id.
    ///
    /// Returns `None` if a structurally equal fact is already present.
    pub fn declare(&mut self, fact: Fact) -> Option<FactId> {
        if let Some(existing) = self.by_content.get(&fact) {
            debug!("duplicate declare ignored (already {existing:?})");
            return None;
        }

        let id = FactId::new(self.next);
        self.next += 1;

        let stored = fact.with_id(id);
        self.by_content.insert(stored.clone(), id);
        self.by_id.insert(id, stored);
        Some(id)
    }

    /// Retracts a fact by id, returning it.
    ///
    /// # Errors
    ///
    /// Returns an unknown-fact error if the id is not present.
    pub fn retract(&mut self, id: FactId) -> Result<Fact> {
        let fact = self
            .by_id
            .remove(&id)
            .ok_or_else(|| Error::unknown_fact(id))?;
        self.by_content.remove(&fact);
        Ok(fact)
    }

    /// Gets a fact by id.
    #[must_use]
    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.by_id.get(&id)
    }

    /// Returns the id of a structurally equal fact, if declared.
    #[must_use]
    pub fn find(&self, fact: &Fact) -> Option<FactId> {
        self.by_content.get(fact).copied()
    }

    /// Iterates facts in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.by_id.values()
    }

    /// Returns the number of live facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if no facts are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
