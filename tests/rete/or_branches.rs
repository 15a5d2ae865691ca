//! Integration tests for OR-branch wiring and per-disjunct counting.

use crate::Fixture;
use retort_foundation::Fact;
use retort_rete::{Condition, FactPattern, FieldTest};

#[test]
fn or_of_three_negations_activates_once_per_disjunct() {
    let mut fx = Fixture::new();
    let a = fx.keyword("a");

    // OR(NOT a(1), NOT a(2), NOT a(3)) over an empty base.
    let cond = Condition::any(vec![
        Condition::negate(FactPattern::new(a).with_arg(FieldTest::literal(1)).into()),
        Condition::negate(FactPattern::new(a).with_arg(FieldTest::literal(2)).into()),
        Condition::negate(FactPattern::new(a).with_arg(FieldTest::literal(3)).into()),
    ]);
    fx.rule("any-absent", cond);

    fx.network.declare(&Fact::initial()).unwrap();

    // Three independent activations, one per disjunct.
    let activations = fx.network.activations();
    assert_eq!(activations.len(), 3);

    // Declaring a(2) suppresses exactly the middle disjunct.
    fx.network.declare(&Fact::new(a).with_arg(2)).unwrap();
    let branches: Vec<u32> = fx.network.activations().iter().map(|a| a.branch).collect();
    assert_eq!(branches, vec![0, 2]);
}

#[test]
fn or_join_structural_example() {
    let mut fx = Fixture::new();
    let f = fx.keyword("f");

    let lit = |fx: &mut Fixture, v: &str| -> Condition {
        let kind = fx.keyword("f");
        FactPattern::new(kind)
            .with_arg(FieldTest::literal(v))
            .into()
    };
    let one = FactPattern::new(f).with_arg(FieldTest::literal(1)).into();

    // AND(f(1), OR(f("a"), f("b")), OR(f("x"), f("y")))
    let cond = Condition::all(vec![
        one,
        Condition::any(vec![lit(&mut fx, "a"), lit(&mut fx, "b")]),
        Condition::any(vec![lit(&mut fx, "x"), lit(&mut fx, "y")]),
    ]);
    fx.rule("combo", cond);

    let f1 = Fact::new(f).with_arg(1);
    let fa = Fact::new(f).with_arg("a");
    let fx_fact = Fact::new(f).with_arg("x");
    let fy = Fact::new(f).with_arg("y");

    fx.network.declare(&f1).unwrap();
    fx.network.declare(&fa).unwrap();
    fx.network.declare(&fx_fact).unwrap();
    assert_eq!(fx.network.activations().len(), 1);

    // Retracting the only x-side fact empties the conflict set.
    fx.network.retract(&fx_fact).unwrap();
    assert_eq!(fx.network.activations().len(), 0);

    // A different disjunct of the second OR restores exactly one match.
    fx.network.declare(&fy).unwrap();
    assert_eq!(fx.network.activations().len(), 1);
}

#[test]
fn overlapping_or_branches_each_match() {
    let mut fx = Fixture::new();
    let a = fx.keyword("a");
    let b = fx.keyword("b");

    // OR(a, AND(a, b)): both branches hold once a and b are present.
    let cond = Condition::any(vec![
        FactPattern::new(a).into(),
        Condition::all(vec![
            FactPattern::new(a).into(),
            FactPattern::new(b).into(),
        ]),
    ]);
    fx.rule("overlap", cond);

    fx.network.declare(&Fact::new(a)).unwrap();
    assert_eq!(fx.network.activations().len(), 1);

    fx.network.declare(&Fact::new(b)).unwrap();
    let activations = fx.network.activations();
    assert_eq!(activations.len(), 2);
    assert_ne!(activations[0].branch, activations[1].branch);
}
