//! Integration tests for fact identity and field addressing.

use retort_foundation::{Fact, FactId, FieldKey, Interner, KeywordId, Value};

#[test]
fn fact_identity_is_structural_not_referential() {
    let mut interner = Interner::new();
    let kind = interner.intern_keyword("reading");
    let vf = interner.intern_keyword("value");

    let a = Fact::new(kind).with_named(vf, 10);
    let b = Fact::new(kind).with_named(vf, 10).with_id(FactId::new(3));

    // Same structure, different identity metadata: still equal.
    assert_eq!(a, b);

    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(a);
    assert!(set.contains(&b));
}

#[test]
fn mixed_positional_and_named_fields() {
    let mut interner = Interner::new();
    let kind = interner.intern_keyword("edge");
    let weight = interner.intern_keyword("weight");

    let fact = Fact::new(kind)
        .with_arg("src")
        .with_arg("dst")
        .with_named(weight, 4);

    assert_eq!(fact.get(FieldKey::Pos(0)), Some(&Value::from("src")));
    assert_eq!(fact.get(FieldKey::Pos(1)), Some(&Value::from("dst")));
    assert_eq!(fact.get(FieldKey::Named(weight)), Some(&Value::Int(4)));
    assert_eq!(fact.len(), 3);
}

#[test]
fn facts_of_different_kinds_never_compare_equal() {
    let mut interner = Interner::new();
    let a = interner.intern_keyword("a");
    let b = interner.intern_keyword("b");

    assert_ne!(Fact::new(a), Fact::new(b));
}

#[test]
fn initial_fact_is_reserved_and_empty() {
    let fact = Fact::initial();
    assert_eq!(fact.kind(), KeywordId::INITIAL_FACT);
    assert!(fact.is_empty());

    // Interning the name again resolves to the same kind.
    let mut interner = Interner::new();
    assert_eq!(interner.intern_keyword("initial-fact"), fact.kind());
}
