//! Incrementality properties.
//!
//! The network's correctness contract: after any sequence of declares and
//! retracts, every conflict set equals what a from-scratch evaluation of
//! the rules against the live fact set would produce, and a declare
//! immediately undone by its retract restores every node memory exactly.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use retort_engine::{Engine, Rule};
use retort_foundation::{Fact, FactId, Interner, KeywordId, SymbolId, Value};
use retort_rete::{Activation, Condition, FactPattern, FieldTest, ReteNetwork};

// =============================================================================
// Naive Reference Evaluator
// =============================================================================

/// A deliberately brute-force pattern matcher, independent of the network
/// code, supporting the literal and capture tests the property rules use.
fn match_pattern(pattern: &FactPattern, fact: &Fact) -> Option<BTreeMap<SymbolId, Value>> {
    if fact.kind() != pattern.kind {
        return None;
    }
    let mut bindings = BTreeMap::new();
    for (key, test) in &pattern.fields {
        let value = fact.get(*key)?;
        match test {
            FieldTest::Literal(expected) => {
                if value != expected {
                    return None;
                }
            }
            FieldTest::Capture(name) => match bindings.get(name) {
                Some(previous) if previous != value => return None,
                Some(_) => {}
                None => {
                    bindings.insert(*name, value.clone());
                }
            },
            other => panic!("naive matcher does not support {other:?}"),
        }
    }
    Some(bindings)
}

fn merge(
    a: &BTreeMap<SymbolId, Value>,
    b: &BTreeMap<SymbolId, Value>,
) -> Option<BTreeMap<SymbolId, Value>> {
    let mut merged = a.clone();
    for (key, value) in b {
        match merged.get(key) {
            Some(existing) if existing != value => return None,
            Some(_) => {}
            None => {
                merged.insert(*key, value.clone());
            }
        }
    }
    Some(merged)
}

/// Canonical activation signature: rule, fact-id set, sorted bindings.
/// Values are rendered to strings so the signature is totally ordered.
type Signature = (KeywordId, BTreeSet<FactId>, Vec<(SymbolId, String)>);

fn signature_of(activation: &Activation) -> Signature {
    let ids = activation.facts.iter().filter_map(Fact::id).collect();
    let mut bindings: Vec<(SymbolId, String)> = activation
        .context
        .iter()
        .filter(|(key, _)| !key.negated)
        .map(|(key, value)| (key.name, format!("{value:?}")))
        .collect();
    bindings.sort_by_key(|(name, _)| *name);
    (activation.rule, ids, bindings)
}

/// From-scratch evaluation of `positives AND NOT negative` rules.
struct NaiveRule {
    name: KeywordId,
    positives: Vec<FactPattern>,
    negative: Option<FactPattern>,
}

fn naive_eval(rules: &[NaiveRule], facts: &[Fact]) -> BTreeSet<Signature> {
    let mut signatures = BTreeSet::new();
    for rule in rules {
        let mut partials: Vec<(BTreeSet<FactId>, BTreeMap<SymbolId, Value>)> =
            vec![(BTreeSet::new(), BTreeMap::new())];

        for pattern in &rule.positives {
            let mut extended = Vec::new();
            for (ids, bindings) in &partials {
                for fact in facts {
                    let Some(produced) = match_pattern(pattern, fact) else {
                        continue;
                    };
                    let Some(merged) = merge(bindings, &produced) else {
                        continue;
                    };
                    let mut ids = ids.clone();
                    ids.extend(fact.id());
                    extended.push((ids, merged));
                }
            }
            partials = extended;
        }

        for (ids, bindings) in partials {
            if let Some(negative) = &rule.negative {
                let blocked = facts.iter().any(|fact| {
                    match_pattern(negative, fact)
                        .is_some_and(|produced| merge(&bindings, &produced).is_some())
                });
                if blocked {
                    continue;
                }
            }
            let sorted: Vec<(SymbolId, String)> = bindings
                .into_iter()
                .map(|(name, value)| (name, format!("{value:?}")))
                .collect();
            signatures.insert((rule.name, ids, sorted));
        }
    }
    signatures
}

// =============================================================================
// Property Fixtures
// =============================================================================

struct PropFixture {
    engine: Engine,
    naive_rules: Vec<NaiveRule>,
    sensor: KeywordId,
    alarm: KeywordId,
}

/// Two rules over the same alpha space: a join and a negation.
fn build_fixture() -> PropFixture {
    let mut engine = Engine::new();
    let sensor = engine.interner_mut().intern_keyword("sensor");
    let alarm = engine.interner_mut().intern_keyword("alarm");
    let x = engine.interner_mut().intern_symbol("x");
    let paired = engine.interner_mut().intern_keyword("paired");
    let silent = engine.interner_mut().intern_keyword("silent");

    let sensor_pattern = FactPattern::new(sensor).with_arg(FieldTest::capture(x));
    let alarm_pattern = FactPattern::new(alarm).with_arg(FieldTest::capture(x));

    engine
        .add_rule(Rule::new(
            paired,
            Condition::all(vec![
                sensor_pattern.clone().into(),
                alarm_pattern.clone().into(),
            ]),
        ))
        .unwrap();
    engine
        .add_rule(Rule::new(
            silent,
            Condition::all(vec![
                sensor_pattern.clone().into(),
                Condition::negate(alarm_pattern.clone().into()),
            ]),
        ))
        .unwrap();
    engine.reset().unwrap();

    let naive_rules = vec![
        NaiveRule {
            name: paired,
            positives: vec![sensor_pattern.clone(), alarm_pattern.clone()],
            negative: None,
        },
        NaiveRule {
            name: silent,
            positives: vec![sensor_pattern],
            negative: Some(alarm_pattern),
        },
    ];

    PropFixture {
        engine,
        naive_rules,
        sensor,
        alarm,
    }
}

/// One step of a random workload: declare or retract a small fact.
#[derive(Clone, Debug)]
struct Op {
    declare: bool,
    alarm_kind: bool,
    value: i64,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (any::<bool>(), any::<bool>(), 0i64..4).prop_map(|(declare, alarm_kind, value)| Op {
        declare,
        alarm_kind,
        value,
    })
}

proptest! {
    /// Random declare/retract sequences leave the conflict sets equal to
    /// a from-scratch evaluation over the surviving facts.
    #[test]
    fn incremental_matches_from_scratch(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut fx = build_fixture();

        for op in ops {
            let kind = if op.alarm_kind { fx.alarm } else { fx.sensor };
            let fact = Fact::new(kind).with_arg(op.value);
            if op.declare {
                fx.engine.declare(fact).unwrap();
            } else if let Some(id) = fx.engine.find_fact(&fact) {
                fx.engine.retract(id).unwrap();
            }
        }

        let live: Vec<Fact> = fx.engine.facts().cloned().collect();
        let expected = naive_eval(&fx.naive_rules, &live);
        let actual: BTreeSet<Signature> =
            fx.engine.activations().iter().map(signature_of).collect();

        prop_assert_eq!(actual, expected);
    }

    /// Declaring then immediately retracting a fact restores every node
    /// memory to its prior state.
    #[test]
    fn declare_retract_is_identity(
        prefix in proptest::collection::vec(op_strategy(), 0..20),
        probe in op_strategy(),
    ) {
        let mut fx = build_fixture();

        for op in prefix {
            let kind = if op.alarm_kind { fx.alarm } else { fx.sensor };
            let fact = Fact::new(kind).with_arg(op.value);
            if op.declare {
                fx.engine.declare(fact).unwrap();
            } else if let Some(id) = fx.engine.find_fact(&fact) {
                fx.engine.retract(id).unwrap();
            }
        }

        let kind = if probe.alarm_kind { fx.alarm } else { fx.sensor };
        let fact = Fact::new(kind).with_arg(probe.value);
        // Only probe with a fresh fact; a duplicate declare is a no-op by
        // design and retracting it would remove the original.
        prop_assume!(fx.engine.find_fact(&fact).is_none());

        let before: BTreeSet<Signature> =
            fx.engine.activations().iter().map(signature_of).collect();

        let id = fx.engine.declare(fact).unwrap().unwrap();
        fx.engine.retract(id).unwrap();

        let after: BTreeSet<Signature> =
            fx.engine.activations().iter().map(signature_of).collect();
        prop_assert_eq!(before, after);
    }
}

// =============================================================================
// Deterministic Inverse Check (node memories, not just activations)
// =============================================================================

#[test]
fn declare_retract_restores_every_node_memory() {
    let mut interner = Interner::new();
    let sensor = interner.intern_keyword("sensor");
    let alarm = interner.intern_keyword("alarm");
    let x = interner.intern_symbol("x");
    let silent = interner.intern_keyword("silent");

    let mut network = ReteNetwork::new();
    network
        .add_production(
            silent,
            "silent",
            Condition::all(vec![
                FactPattern::new(sensor)
                    .with_arg(FieldTest::capture(x))
                    .into(),
                Condition::negate(
                    FactPattern::new(alarm)
                        .with_arg(FieldTest::capture(x))
                        .into(),
                ),
            ]),
        )
        .unwrap();

    for value in 0..3i64 {
        network.declare(&Fact::new(sensor).with_arg(value)).unwrap();
    }
    let baseline = network.memory_sizes();

    let probe = Fact::new(alarm).with_arg(1i64);
    network.declare(&probe).unwrap();
    assert_ne!(network.memory_sizes(), baseline);

    network.retract(&probe).unwrap();
    assert_eq!(network.memory_sizes(), baseline);
}
