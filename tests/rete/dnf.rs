//! Worked DNF rewriting examples through the public API.

use retort_foundation::Interner;
use retort_rete::{Condition, FactPattern, FieldTest, to_dnf};

fn fact(interner: &mut Interner, kind: &str, value: i64) -> Condition {
    let kw = interner.intern_keyword(kind);
    Condition::Pattern(FactPattern::new(kw).with_arg(FieldTest::literal(value)))
}

#[test]
fn and_over_or_distributes() {
    let mut i = Interner::new();

    // AND(Fact(1), OR(Fact(2), Fact(3)))
    let cond = Condition::all(vec![
        fact(&mut i, "a", 1),
        Condition::any(vec![fact(&mut i, "a", 2), fact(&mut i, "a", 3)]),
    ]);

    // => OR(AND(Fact(1), Fact(2)), AND(Fact(1), Fact(3)))
    let expected = Condition::any(vec![
        Condition::all(vec![fact(&mut i, "a", 1), fact(&mut i, "a", 2)]),
        Condition::all(vec![fact(&mut i, "a", 1), fact(&mut i, "a", 3)]),
    ]);

    assert_eq!(to_dnf(cond), expected);
}

#[test]
fn double_negation_cancels() {
    let mut i = Interner::new();
    let cond = Condition::negate(Condition::negate(fact(&mut i, "a", 1)));
    assert_eq!(to_dnf(cond), fact(&mut i, "a", 1));
}

#[test]
fn negated_or_becomes_and_of_negations() {
    let mut i = Interner::new();
    let cond = Condition::negate(Condition::any(vec![
        fact(&mut i, "a", 1),
        fact(&mut i, "a", 2),
    ]));

    let expected = Condition::all(vec![
        Condition::negate(fact(&mut i, "a", 1)),
        Condition::negate(fact(&mut i, "a", 2)),
    ]);

    assert_eq!(to_dnf(cond), expected);
}

#[test]
fn rewriting_an_already_normal_form_is_identity() {
    let mut i = Interner::new();

    let normal = Condition::any(vec![
        Condition::all(vec![fact(&mut i, "a", 1), fact(&mut i, "b", 1)]),
        Condition::all(vec![
            fact(&mut i, "a", 2),
            Condition::negate(fact(&mut i, "b", 2)),
        ]),
    ]);

    assert_eq!(to_dnf(normal.clone()), normal);
}

#[test]
fn deep_nesting_reaches_a_fixed_point() {
    let mut i = Interner::new();

    // AND(OR(1, AND(2, OR(3, 4))), NOT(NOT(5)))
    let cond = Condition::all(vec![
        Condition::any(vec![
            fact(&mut i, "a", 1),
            Condition::all(vec![
                fact(&mut i, "a", 2),
                Condition::any(vec![fact(&mut i, "a", 3), fact(&mut i, "a", 4)]),
            ]),
        ]),
        Condition::negate(Condition::negate(fact(&mut i, "a", 5))),
    ]);

    let once = to_dnf(cond);
    assert_eq!(to_dnf(once.clone()), once);

    // Result is an OR of ANDs over plain patterns.
    let Condition::Or(branches) = once else {
        panic!("expected top-level OR");
    };
    assert_eq!(branches.len(), 3);
    for branch in branches {
        let Condition::And(elems) = branch else {
            panic!("expected AND branch");
        };
        assert!(
            elems
                .iter()
                .all(|e| matches!(e, Condition::Pattern(_) | Condition::Not(_)))
        );
    }
}
