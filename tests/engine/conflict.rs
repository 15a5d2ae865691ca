//! Conflict resolution: salience, recency, and refraction.

use crate::Fixture;
use retort_engine::Rule;
use retort_foundation::{Fact, KeywordId};
use retort_rete::{FactPattern, FieldTest};

#[test]
fn higher_salience_fires_first_regardless_of_registration_order() {
    let mut fx = Fixture::new();
    let kind = fx.keyword("event");
    let log = fx.keyword("log");
    let escalate = fx.keyword("escalate");

    fx.engine
        .add_rule(Rule::new(log, FactPattern::new(kind).into()).with_salience(-10))
        .unwrap();
    fx.engine
        .add_rule(Rule::new(escalate, FactPattern::new(kind).into()).with_salience(10))
        .unwrap();
    fx.engine.reset().unwrap();
    fx.engine.declare(Fact::new(kind)).unwrap();

    let mut order: Vec<KeywordId> = Vec::new();
    fx.engine
        .run(|activation| {
            order.push(activation.rule);
            Vec::new()
        })
        .unwrap();

    assert_eq!(order, vec![escalate, log]);
}

#[test]
fn equal_salience_fires_most_recent_fact_first() {
    let mut fx = Fixture::new();
    let kind = fx.keyword("event");
    let rule = fx.keyword("handle");

    fx.engine
        .add_rule(Rule::new(rule, FactPattern::new(kind).into()))
        .unwrap();
    fx.engine.reset().unwrap();

    let first = fx
        .engine
        .declare(Fact::new(kind).with_arg(1))
        .unwrap()
        .unwrap();
    let second = fx
        .engine
        .declare(Fact::new(kind).with_arg(2))
        .unwrap()
        .unwrap();

    let mut order = Vec::new();
    fx.engine
        .run(|activation| {
            order.push(activation.recency().unwrap());
            Vec::new()
        })
        .unwrap();

    assert_eq!(order, vec![second, first]);
}

#[test]
fn refraction_survives_unrelated_fact_churn() {
    let mut fx = Fixture::new();
    let kind = fx.keyword("event");
    let other = fx.keyword("other");
    let rule = fx.keyword("handle");

    fx.engine
        .add_rule(Rule::new(rule, FactPattern::new(kind).into()))
        .unwrap();
    fx.engine.reset().unwrap();

    fx.engine.declare(Fact::new(kind)).unwrap();
    assert_eq!(fx.engine.run(|_| Vec::new()).unwrap(), 1);

    // Unrelated churn must not make the old activation fire again.
    let id = fx.engine.declare(Fact::new(other)).unwrap().unwrap();
    fx.engine.retract(id).unwrap();
    assert_eq!(fx.engine.run(|_| Vec::new()).unwrap(), 0);
}

#[test]
fn retract_and_redeclare_fires_again_with_fresh_identity() {
    let mut fx = Fixture::new();
    let kind = fx.keyword("event");
    let rule = fx.keyword("handle");

    fx.engine
        .add_rule(Rule::new(rule, FactPattern::new(kind).into()))
        .unwrap();
    fx.engine.reset().unwrap();

    let id = fx.engine.declare(Fact::new(kind)).unwrap().unwrap();
    assert_eq!(fx.engine.run(|_| Vec::new()).unwrap(), 1);

    fx.engine.retract(id).unwrap();
    fx.engine.declare(Fact::new(kind)).unwrap();

    // New fact id, new activation identity: fires again.
    assert_eq!(fx.engine.run(|_| Vec::new()).unwrap(), 1);
}

#[test]
fn ties_fall_back_to_registration_order() {
    let mut fx = Fixture::new();
    let kind = fx.keyword("event");
    let first = fx.keyword("first");
    let second = fx.keyword("second");

    // Same salience, same fact: conflict-set order decides.
    fx.engine
        .add_rule(Rule::new(first, FactPattern::new(kind).into()))
        .unwrap();
    fx.engine
        .add_rule(Rule::new(second, FactPattern::new(kind).into()))
        .unwrap();
    fx.engine.reset().unwrap();
    fx.engine.declare(Fact::new(kind)).unwrap();

    let mut order = Vec::new();
    fx.engine
        .run(|activation| {
            order.push(activation.rule);
            Vec::new()
        })
        .unwrap();

    assert_eq!(order, vec![first, second]);
}

#[test]
fn salience_interleaves_with_effects() {
    let mut fx = Fixture::new();
    let alert = fx.keyword("alert");
    let page = fx.keyword("page");
    let notify = fx.keyword("notify");
    let triage = fx.keyword("triage");

    // triage (high salience) matches alerts and declares pages; notify
    // (low salience) matches pages.
    fx.engine
        .add_rule(Rule::new(triage, FactPattern::new(alert).into()).with_salience(100))
        .unwrap();
    fx.engine
        .add_rule(
            Rule::new(
                notify,
                FactPattern::new(page).with_arg(FieldTest::Present).into(),
            )
            .with_salience(0),
        )
        .unwrap();
    fx.engine.reset().unwrap();

    fx.engine.declare(Fact::new(alert).with_arg(1)).unwrap();
    fx.engine.declare(Fact::new(alert).with_arg(2)).unwrap();

    let mut order = Vec::new();
    let mut page_no = 0i64;
    fx.engine
        .run(|activation| {
            order.push(activation.rule);
            if activation.rule == triage {
                page_no += 1;
                vec![retort_engine::Effect::Declare(
                    Fact::new(page).with_arg(page_no),
                )]
            } else {
                Vec::new()
            }
        })
        .unwrap();

    // Both triage firings precede both notifications.
    assert_eq!(order, vec![triage, triage, notify, notify]);
}
