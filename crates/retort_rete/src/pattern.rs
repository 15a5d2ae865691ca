//! Rule condition trees: fact patterns, field tests, and combinators.
//!
//! A rule's condition is a closed tree of AND / OR / NOT combinators over
//! fact patterns and free-standing boolean tests. The DNF rewriter and the
//! network builder both walk this tree by structural recursion.

use std::fmt;
use std::hash::{Hash, Hasher};

use retort_foundation::{FieldKey, KeywordId, SymbolId, Value};

// =============================================================================
// Predicates
// =============================================================================

/// A named boolean function over values.
///
/// In a field position the function receives the field value followed by
/// the values of `args` looked up in the token's binding context. In a
/// free-standing test position it receives only the `args` values.
#[derive(Clone)]
pub struct Predicate {
    /// Function name for debugging.
    pub name: &'static str,
    /// Function pointer.
    pub func: fn(&[Value]) -> bool,
    /// Context variables appended to the argument list.
    pub args: Vec<SymbolId>,
}

impl Predicate {
    /// Creates a predicate over the field value alone.
    #[must_use]
    pub fn new(name: &'static str, func: fn(&[Value]) -> bool) -> Self {
        Self {
            name,
            func,
            args: Vec::new(),
        }
    }

    /// Adds context variables to the argument list.
    #[must_use]
    pub fn with_args(mut self, args: Vec<SymbolId>) -> Self {
        self.args = args;
        self
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.func, other.func) && self.args == other.args
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.func as usize).hash(state);
        self.args.hash(state);
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<predicate {}>", self.name)
    }
}

// =============================================================================
// Field Tests
// =============================================================================

/// A single field constraint within a fact pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldTest {
    /// Field must be present and equal to the literal.
    Literal(Value),
    /// Field must be present (wildcard, presence required).
    Present,
    /// Field must be absent (wildcard, presence forbidden).
    Absent,
    /// Field must be present; its value is bound to the variable.
    Capture(SymbolId),
    /// Field must be present and satisfy the predicate.
    Predicate(Predicate),
    /// All sub-tests must match; their bindings are merged.
    All(Vec<FieldTest>),
    /// First matching sub-test wins; its bindings are returned.
    Any(Vec<FieldTest>),
    /// Inverts the sub-test; captures it declares bind under negated keys.
    Not(Box<FieldTest>),
}

impl FieldTest {
    /// Literal-equality test.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Capture test binding the field's value to `name`.
    #[must_use]
    pub const fn capture(name: SymbolId) -> Self {
        Self::Capture(name)
    }

    /// Literal test that also captures the matched value.
    #[must_use]
    pub fn captured_literal(value: impl Into<Value>, name: SymbolId) -> Self {
        Self::All(vec![Self::Literal(value.into()), Self::Capture(name)])
    }

    /// Predicate test over the field value.
    #[must_use]
    pub fn predicate(name: &'static str, func: fn(&[Value]) -> bool) -> Self {
        Self::Predicate(Predicate::new(name, func))
    }

    /// Negation of a test.
    #[must_use]
    pub fn negate(test: FieldTest) -> Self {
        Self::Not(Box::new(test))
    }

    /// Collects the capture variables this test declares.
    pub(crate) fn collect_captures(&self, out: &mut Vec<SymbolId>) {
        match self {
            Self::Capture(name) => out.push(*name),
            Self::All(tests) | Self::Any(tests) => {
                for t in tests {
                    t.collect_captures(out);
                }
            }
            Self::Not(inner) => inner.collect_captures(out),
            Self::Literal(_) | Self::Present | Self::Absent | Self::Predicate(_) => {}
        }
    }

    /// Collects the context variables consumed by predicates in this test.
    pub(crate) fn collect_predicate_args(&self, out: &mut Vec<SymbolId>) {
        match self {
            Self::Predicate(pred) => out.extend(pred.args.iter().copied()),
            Self::All(tests) | Self::Any(tests) => {
                for t in tests {
                    t.collect_predicate_args(out);
                }
            }
            Self::Not(inner) => inner.collect_predicate_args(out),
            Self::Literal(_) | Self::Present | Self::Absent | Self::Capture(_) => {}
        }
    }

    /// Returns true if this test can match an absent field.
    ///
    /// Patterns containing such a test skip the shape pre-check.
    pub(crate) fn allows_absence(&self) -> bool {
        match self {
            Self::Absent | Self::Not(_) => true,
            Self::All(tests) | Self::Any(tests) => tests.iter().any(FieldTest::allows_absence),
            Self::Literal(_) | Self::Present | Self::Capture(_) | Self::Predicate(_) => false,
        }
    }

    /// Returns true if this is a pure presence test (no value inspection).
    pub(crate) fn is_presence_only(&self) -> bool {
        matches!(self, Self::Present | Self::Absent)
    }

    /// Returns true if this test contains a predicate.
    pub(crate) fn has_predicate(&self) -> bool {
        match self {
            Self::Predicate(_) => true,
            Self::All(tests) | Self::Any(tests) => tests.iter().any(FieldTest::has_predicate),
            Self::Not(inner) => inner.has_predicate(),
            Self::Literal(_) | Self::Present | Self::Absent | Self::Capture(_) => false,
        }
    }

    /// Returns true if this test contains a capture.
    pub(crate) fn has_capture(&self) -> bool {
        let mut captures = Vec::new();
        self.collect_captures(&mut captures);
        !captures.is_empty()
    }
}

// =============================================================================
// Fact Patterns
// =============================================================================

/// A structural template over one fact kind: a conjunction of per-field
/// constraints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactPattern {
    /// The fact kind this pattern matches. Kinds compare by equality,
    /// never by any subtype relation.
    pub kind: KeywordId,
    /// Field constraints, in declaration order.
    pub fields: Vec<(FieldKey, FieldTest)>,
}

impl FactPattern {
    /// Creates a pattern over the given fact kind with no constraints.
    #[must_use]
    pub fn new(kind: KeywordId) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Creates the pattern matching the implicit initial fact.
    #[must_use]
    pub fn initial() -> Self {
        Self::new(KeywordId::INITIAL_FACT)
    }

    /// Adds a field constraint.
    #[must_use]
    pub fn with(mut self, key: FieldKey, test: FieldTest) -> Self {
        self.fields.push((key, test));
        self
    }

    /// Adds a named field constraint.
    #[must_use]
    pub fn with_named(self, name: KeywordId, test: FieldTest) -> Self {
        self.with(FieldKey::Named(name), test)
    }

    /// Adds a constraint on the next positional field.
    #[must_use]
    pub fn with_arg(self, test: FieldTest) -> Self {
        let next = self
            .fields
            .iter()
            .filter_map(|(k, _)| match k {
                FieldKey::Pos(i) => Some(*i + 1),
                FieldKey::Named(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.with(FieldKey::Pos(next), test)
    }

    /// Returns the capture variables declared across all fields.
    #[must_use]
    pub fn captures(&self) -> Vec<SymbolId> {
        let mut out = Vec::new();
        for (_, test) in &self.fields {
            test.collect_captures(&mut out);
        }
        out
    }

    /// Returns true if any field test can match an absent field.
    #[must_use]
    pub fn allows_absence(&self) -> bool {
        self.fields.iter().any(|(_, t)| t.allows_absence())
    }
}

// =============================================================================
// Condition Trees
// =============================================================================

/// A rule's condition: AND / OR / NOT combinators over patterns and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// A single fact pattern.
    Pattern(FactPattern),
    /// A free-standing boolean test over bound variables.
    Test(Predicate),
    /// Conjunction.
    And(Vec<Condition>),
    /// Disjunction.
    Or(Vec<Condition>),
    /// Negation-as-failure.
    Not(Box<Condition>),
}

impl Condition {
    /// Conjunction of conditions.
    #[must_use]
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self::And(conditions)
    }

    /// Disjunction of conditions.
    #[must_use]
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self::Or(conditions)
    }

    /// Negation of a condition.
    #[must_use]
    pub fn negate(condition: Condition) -> Self {
        Self::Not(Box::new(condition))
    }

    /// A free-standing test over bound variables.
    #[must_use]
    pub fn test(name: &'static str, func: fn(&[Value]) -> bool, args: Vec<SymbolId>) -> Self {
        Self::Test(Predicate::new(name, func).with_args(args))
    }
}

impl From<FactPattern> for Condition {
    fn from(pattern: FactPattern) -> Self {
        Self::Pattern(pattern)
    }
}
