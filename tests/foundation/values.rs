//! Integration tests for the value type.

use retort_foundation::{Interner, Value};

#[test]
fn values_compare_structurally() {
    assert_eq!(Value::from("abc"), Value::from("abc"));
    assert_eq!(Value::from(vec![1i32, 2]), Value::from(vec![1i32, 2]));
    assert_ne!(Value::from(vec![1i32, 2]), Value::from(vec![2i32, 1]));
}

#[test]
fn int_and_float_are_distinct_values() {
    // Matching is structural; the matcher must not unify 1 and 1.0.
    assert_ne!(Value::Int(1), Value::Float(1.0));
}

#[test]
fn keywords_compare_by_identity() {
    let mut interner = Interner::new();
    let a1 = interner.intern_keyword("status/open");
    let a2 = interner.intern_keyword("status/open");
    let b = interner.intern_keyword("status/closed");

    assert_eq!(Value::Keyword(a1), Value::Keyword(a2));
    assert_ne!(Value::Keyword(a1), Value::Keyword(b));
}

#[test]
fn cross_type_numeric_ordering() {
    assert!(Value::Int(1) < Value::Float(1.5));
    assert!(Value::Float(0.5) < Value::Int(1));
    // Non-comparable types yield no ordering.
    assert!(Value::Int(1).partial_cmp(&Value::from("a")).is_none());
}
