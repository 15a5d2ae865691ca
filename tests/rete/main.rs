//! Integration tests for Layer 1: the RETE matching network.
//!
//! Tests for DNF compilation, joins, negation, OR branches, and the
//! incremental-equivalence property.

mod dnf;
mod incremental;
mod or_branches;

use retort_foundation::{Interner, KeywordId};
use retort_rete::ReteNetwork;

/// Shared fixture: an interner plus a network.
pub struct Fixture {
    pub interner: Interner,
    pub network: ReteNetwork,
}

impl Fixture {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            interner: Interner::new(),
            network: ReteNetwork::new(),
        }
    }

    pub fn keyword(&mut self, s: &str) -> KeywordId {
        self.interner.intern_keyword(s)
    }

    pub fn rule(&mut self, name: &str, condition: retort_rete::Condition) {
        let rule = self.keyword(name);
        self.network.add_production(rule, name, condition).unwrap();
    }
}
