//! Alpha-stage checks: single-fact tests run before any cross-pattern join.
//!
//! Each alpha node holds exactly one [`AlphaCheck`]. A token entering the
//! node either emerges with a possibly enriched context or is dropped;
//! alpha nodes hold no memory.

use retort_foundation::{Fact, FieldKey, KeywordId, Value};

use crate::pattern::{FactPattern, FieldTest, Predicate};
use crate::token::{CaptureKey, Context, Token};

// =============================================================================
// Alpha Checks
// =============================================================================

/// One single-input test in an alpha chain.
///
/// Checks are wired cheapest-first: kind, then shape, then presence-only
/// field tests, then value and predicate tests. Structurally equal checks
/// under the same parent share one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlphaCheck {
    /// The fact's kind must equal the pattern's kind exactly.
    Kind(KeywordId),
    /// The fact's field-key set must cover the pattern's declared keys.
    ///
    /// Omitted for patterns containing any test that can match an absent
    /// field.
    Shape(Vec<FieldKey>),
    /// A per-field constraint.
    Field {
        /// The field under test.
        key: FieldKey,
        /// The constraint.
        test: FieldTest,
    },
}

impl AlphaCheck {
    /// Applies this check to a token's single fact.
    ///
    /// Returns the token to forward (context possibly enriched), or `None`
    /// when the check rejects the fact. Valid and invalid tokens are
    /// treated identically; a retraction must retrace its assertion's path.
    #[must_use]
    pub fn apply(&self, token: &Token, fact: &Fact) -> Option<Token> {
        match self {
            Self::Kind(kind) => (fact.kind() == *kind).then(|| token.clone()),
            Self::Shape(keys) => keys.iter().all(|k| fact.has(*k)).then(|| token.clone()),
            Self::Field { key, test } => {
                let bindings = eval_field_test(test, fact.get(*key), &token.context)?;
                let mut context = token.context.clone();
                for (key, value) in bindings {
                    context = context.bind(key, value)?;
                }
                Some(token.with_context(context))
            }
        }
    }
}

// =============================================================================
// Field Test Evaluation
// =============================================================================

/// Bindings produced by a successful field test.
type Bindings = Vec<(CaptureKey, Value)>;

/// Evaluates a field test against a field value (or its absence).
///
/// Returns the bindings the test emits on success, or `None` on failure.
/// Predicates may consume variables already bound in `context` (captures
/// from earlier checks of the same pattern).
fn eval_field_test(test: &FieldTest, value: Option<&Value>, context: &Context) -> Option<Bindings> {
    match test {
        FieldTest::Literal(expected) => (value == Some(expected)).then(Vec::new),

        FieldTest::Present => value.is_some().then(Vec::new),

        FieldTest::Absent => value.is_none().then(Vec::new),

        FieldTest::Capture(name) => {
            let value = value?;
            Some(vec![(CaptureKey::positive(*name), value.clone())])
        }

        FieldTest::Predicate(pred) => {
            let value = value?;
            eval_predicate(pred, Some(value), context).then(Vec::new)
        }

        FieldTest::All(tests) => {
            let mut bindings: Bindings = Vec::new();
            for test in tests {
                let produced = eval_field_test(test, value, context)?;
                for (key, value) in produced {
                    merge_binding(&mut bindings, key, value)?;
                }
            }
            Some(bindings)
        }

        FieldTest::Any(tests) => tests
            .iter()
            .find_map(|test| eval_field_test(test, value, context)),

        FieldTest::Not(inner) => match eval_field_test(inner, value, context) {
            Some(_) => None,
            None => Some(negated_bindings(inner, value)),
        },
    }
}

/// Evaluates a predicate with the field value (if any) prepended to the
/// looked-up context arguments. A referenced variable missing from the
/// context fails the test rather than erroring; compile-time validation
/// makes that unreachable for well-ordered patterns.
pub(crate) fn eval_predicate(pred: &Predicate, value: Option<&Value>, context: &Context) -> bool {
    let mut argv: Vec<Value> = Vec::with_capacity(pred.args.len() + 1);
    if let Some(value) = value {
        argv.push(value.clone());
    }
    for arg in &pred.args {
        match context.bound(*arg) {
            Some(v) => argv.push(v.clone()),
            None => return false,
        }
    }
    (pred.func)(&argv)
}

/// Accumulates a binding into a field-local binding list, rejecting the
/// same conflicts a context would.
fn merge_binding(bindings: &mut Bindings, key: CaptureKey, value: Value) -> Option<()> {
    for (existing_key, existing_value) in bindings.iter() {
        if *existing_key == key {
            return (*existing_value == value).then_some(());
        }
        if *existing_key == key.flipped() && *existing_value == value {
            return None;
        }
    }
    bindings.push((key, value));
    Some(())
}

/// Bindings emitted when an inverted test matches: every capture the inner
/// test declares binds the actual field value under a negated key. An
/// absent field has no value to record.
fn negated_bindings(inner: &FieldTest, value: Option<&Value>) -> Bindings {
    let Some(value) = value else {
        return Vec::new();
    };
    let mut captures = Vec::new();
    inner.collect_captures(&mut captures);
    captures
        .into_iter()
        .map(|name| (CaptureKey::negated(name), value.clone()))
        .collect()
}

// =============================================================================
// Check Ordering
// =============================================================================

/// Builds the ordered check chain for a pattern.
///
/// Priority: kind check, shape check, presence-only wildcards, plain value
/// tests, capture-bearing tests, predicate tests. Capture-bearing tests
/// run before predicates so same-pattern predicate arguments are bound by
/// the time they are needed; within a priority class, fields wire in key
/// order so identical patterns produce identical chains for node sharing.
#[must_use]
pub fn alpha_checks(pattern: &FactPattern) -> Vec<AlphaCheck> {
    let mut checks = vec![AlphaCheck::Kind(pattern.kind)];

    if !pattern.allows_absence() && !pattern.fields.is_empty() {
        let mut keys: Vec<FieldKey> = pattern.fields.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        checks.push(AlphaCheck::Shape(keys));
    }

    let mut field_checks: Vec<(u8, FieldKey, &FieldTest)> = pattern
        .fields
        .iter()
        .map(|(key, test)| {
            let priority = if test.is_presence_only() {
                0
            } else if test.has_predicate() {
                3
            } else if test.has_capture() {
                2
            } else {
                1
            };
            (priority, *key, test)
        })
        .collect();
    field_checks.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    checks.extend(field_checks.into_iter().map(|(_, key, test)| {
        AlphaCheck::Field {
            key,
            test: test.clone(),
        }
    }));

    checks
}
