//! The forward-chaining engine loop.
//!
//! Ties the pieces together: rules compile into the matching network, the
//! fact list assigns identities and derives insert/retract events, and
//! `run` pops the agenda in conflict-resolution order, handing each fired
//! activation to a caller-supplied handler whose returned effects are
//! applied before the next selection.

use log::debug;

use retort_foundation::{Error, Fact, FactId, Interner, KeywordId, Result, RuntimeLimit};
use retort_rete::{Activation, Condition, ReteNetwork};

use crate::agenda::Agenda;
use crate::factlist::FactList;

// =============================================================================
// Rules
// =============================================================================

/// A declarative rule: a name, a firing priority, and a condition tree.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Rule name (interned keyword).
    pub name: KeywordId,
    /// Priority (higher fires first).
    pub salience: i32,
    /// The condition tree compiled into the network.
    pub condition: Condition,
}

impl Rule {
    /// Creates a rule with default salience.
    #[must_use]
    pub fn new(name: KeywordId, condition: Condition) -> Self {
        Self {
            name,
            salience: 0,
            condition,
        }
    }

    /// Sets the salience (priority).
    #[must_use]
    pub fn with_salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }
}

// =============================================================================
// Effects
// =============================================================================

/// An effect returned by an activation handler, applied by the run loop.
#[derive(Clone, Debug)]
pub enum Effect {
    /// Declare a new fact.
    Declare(Fact),
    /// Retract a fact by id.
    Retract(FactId),
    /// Stop the run after the current firing.
    Halt,
}

// =============================================================================
// Engine
// =============================================================================

/// Default kill-switch threshold for one run.
const DEFAULT_MAX_FIRINGS: usize = 10_000;

/// A forward-chaining rule engine over an incremental matching network.
///
/// Typical flow: intern keywords, [`Engine::add_rule`] for every rule,
/// [`Engine::reset`], then declare facts and [`Engine::run`]. Rules added
/// after facts are declared only see facts declared later; reset to
/// replay the configured startup facts against the full rule set.
pub struct Engine {
    interner: Interner,
    rules: Vec<Rule>,
    network: ReteNetwork,
    facts: FactList,
    agenda: Agenda,
    /// Facts re-declared by every reset, after the initial fact.
    startup_facts: Vec<Fact>,
    max_firings: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with no rules and an empty fact base.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            rules: Vec::new(),
            network: ReteNetwork::new(),
            facts: FactList::new(),
            agenda: Agenda::new(),
            startup_facts: Vec::new(),
            max_firings: DEFAULT_MAX_FIRINGS,
        }
    }

    /// Sets the kill-switch threshold for one run.
    #[must_use]
    pub fn with_max_firings(mut self, max: usize) -> Self {
        self.max_firings = max;
        self
    }

    /// Returns the interner.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns the interner mutably, for interning keywords and capture
    /// variables while building rules and facts.
    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    /// Compiles a rule and wires it into the network.
    ///
    /// # Errors
    ///
    /// Returns a compilation error (duplicate name, unsupported construct,
    /// unbound test variable); the network is unchanged on failure.
    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        let name = self
            .interner
            .keyword(rule.name)
            .unwrap_or("<unknown>")
            .to_string();
        self.network
            .add_production(rule.name, &name, rule.condition.clone())?;
        self.rules.push(rule);
        Ok(())
    }

    /// Registers a fact that every [`Engine::reset`] re-declares.
    pub fn add_startup_fact(&mut self, fact: Fact) {
        self.startup_facts.push(fact);
    }

    /// Clears all node memories, refraction state, and the fact base,
    /// then declares the initial fact followed by the startup facts.
    ///
    /// # Errors
    ///
    /// Propagates failures from re-declaring the configured facts.
    pub fn reset(&mut self) -> Result<()> {
        debug!("engine reset");
        self.network.reset();
        self.agenda.clear();
        self.facts = FactList::new();

        self.declare(Fact::initial())?;
        for fact in self.startup_facts.clone() {
            self.declare(fact)?;
        }
        Ok(())
    }

    /// Declares a fact and propagates the insertion through the network.
    ///
    /// A structural duplicate of a live fact is a no-op returning
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Propagates fail-fast invariant violations from the network.
    pub fn declare(&mut self, fact: Fact) -> Result<Option<FactId>> {
        let Some(id) = self.facts.declare(fact) else {
            return Ok(None);
        };
        let stored = self
            .facts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::internal("declared fact missing from list"))?;
        self.network.declare(&stored)?;
        Ok(Some(id))
    }

    /// Retracts a fact by id and propagates the removal.
    ///
    /// # Errors
    ///
    /// Returns an unknown-fact error for ids that are not live; the
    /// network is not consulted in that case.
    pub fn retract(&mut self, id: FactId) -> Result<Fact> {
        let fact = self.facts.retract(id)?;
        self.network.retract(&fact)?;
        Ok(fact)
    }

    /// Gets a live fact by id.
    #[must_use]
    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(id)
    }

    /// Returns the id of a live, structurally equal fact.
    #[must_use]
    pub fn find_fact(&self, fact: &Fact) -> Option<FactId> {
        self.facts.find(fact)
    }

    /// Iterates the live facts in declaration order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Materializes the current conflict set across all rules.
    #[must_use]
    pub fn activations(&self) -> Vec<Activation> {
        self.network.activations()
    }

    /// Materializes one rule's current conflict set.
    #[must_use]
    pub fn activations_of(&self, rule: KeywordId) -> Vec<Activation> {
        self.network.activations_of(rule)
    }

    /// Runs to quiescence: repeatedly selects the best unfired activation
    /// and hands it to `handler`, applying the returned effects.
    ///
    /// Returns the number of firings.
    ///
    /// # Errors
    ///
    /// Returns a limit-exceeded error when the kill switch triggers, and
    /// propagates effect application failures.
    pub fn run<F>(&mut self, handler: F) -> Result<usize>
    where
        F: FnMut(&Activation) -> Vec<Effect>,
    {
        self.run_limited(self.max_firings, handler)
    }

    /// Runs with an explicit kill-switch threshold.
    ///
    /// # Errors
    ///
    /// As [`Engine::run`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn run_limited<F>(&mut self, max: usize, mut handler: F) -> Result<usize>
    where
        F: FnMut(&Activation) -> Vec<Effect>,
    {
        let mut fired = 0usize;

        loop {
            let rules = &self.rules;
            let pending = self.agenda.select(self.network.activations(), |rule| {
                rules
                    .iter()
                    .find(|r| r.name == rule)
                    .map_or(0, |r| r.salience)
            });

            let Some(activation) = pending.into_iter().next() else {
                break;
            };

            if fired >= max {
                return Err(Error::limit_exceeded(RuntimeLimit::MaxFirings {
                    limit: max as u32,
                }));
            }

            debug!("fire {:?} (branch {})", activation.rule, activation.branch);
            self.agenda.mark_executed(&activation);
            let effects = handler(&activation);
            fired += 1;

            let mut halt = false;
            for effect in effects {
                match effect {
                    Effect::Declare(fact) => {
                        self.declare(fact)?;
                    }
                    Effect::Retract(id) => {
                        self.retract(id)?;
                    }
                    Effect::Halt => halt = true,
                }
            }
            if halt {
                break;
            }
        }

        Ok(fired)
    }
}
