//! Disjunctive-normal-form rewriting and branch normalization.
//!
//! Rule conditions arrive as arbitrarily nested AND / OR / NOT trees. The
//! network builder only wires flat shapes, so conditions are first rewritten
//! to an OR of ANDs whose elements are plain patterns, NOT-wrapped patterns,
//! or boolean tests. Rewriting is a fixed-point iteration: distribution can
//! reintroduce nested ANDs and ORs that need another flattening pass.

use retort_foundation::{Error, Result, SymbolId};

use crate::pattern::{Condition, FactPattern, Predicate};

// =============================================================================
// DNF Rewriter
// =============================================================================

/// Rewrites a condition into disjunctive normal form.
///
/// Applies, bottom-up and repeatedly until nothing changes:
/// - double negation elimination,
/// - De Morgan over negated AND / OR,
/// - one-level AND / OR flattening,
/// - distribution of AND over OR children.
#[must_use]
pub fn to_dnf(condition: Condition) -> Condition {
    let mut current = condition;
    loop {
        let (next, changed) = rewrite(current);
        current = next;
        if !changed {
            return current;
        }
    }
}

/// One bottom-up rewriting pass. Returns the rewritten condition and
/// whether anything changed.
fn rewrite(condition: Condition) -> (Condition, bool) {
    match condition {
        Condition::Pattern(_) | Condition::Test(_) => (condition, false),

        Condition::Not(inner) => {
            let (inner, changed) = rewrite(*inner);
            match inner {
                // NOT(NOT(x)) => x
                Condition::Not(x) => (*x, true),
                // NOT(OR(..)) => AND(NOT(..))
                Condition::Or(xs) => (
                    Condition::And(xs.into_iter().map(Condition::negate).collect()),
                    true,
                ),
                // NOT(AND(..)) => OR(NOT(..))
                Condition::And(xs) => (
                    Condition::Or(xs.into_iter().map(Condition::negate).collect()),
                    true,
                ),
                other => (Condition::negate(other), changed),
            }
        }

        Condition::And(children) => {
            let (children, mut changed) = rewrite_children(children);

            // Flatten nested ANDs one level.
            let (children, flattened) = flatten(children, |c| match c {
                Condition::And(xs) => Ok(xs),
                other => Err(other),
            });
            changed |= flattened;

            // Distribute over OR children.
            if children.iter().any(|c| matches!(c, Condition::Or(_))) {
                (distribute(children), true)
            } else {
                (Condition::And(children), changed)
            }
        }

        Condition::Or(children) => {
            let (children, mut changed) = rewrite_children(children);

            // Flatten nested ORs one level.
            let (children, flattened) = flatten(children, |c| match c {
                Condition::Or(xs) => Ok(xs),
                other => Err(other),
            });
            changed |= flattened;

            (Condition::Or(children), changed)
        }
    }
}

fn rewrite_children(children: Vec<Condition>) -> (Vec<Condition>, bool) {
    let mut changed = false;
    let children = children
        .into_iter()
        .map(|c| {
            let (c, ch) = rewrite(c);
            changed |= ch;
            c
        })
        .collect();
    (children, changed)
}

/// Splices unpacked children in place; `unpack` hands back children it
/// does not recognize.
fn flatten(
    children: Vec<Condition>,
    unpack: impl Fn(Condition) -> std::result::Result<Vec<Condition>, Condition>,
) -> (Vec<Condition>, bool) {
    let mut out = Vec::with_capacity(children.len());
    let mut changed = false;
    for child in children {
        match unpack(child) {
            Ok(xs) => {
                changed = true;
                out.extend(xs);
            }
            Err(child) => out.push(child),
        }
    }
    (out, changed)
}

/// Rewrites `AND(.., OR(a, b), ..)` as an OR of ANDs: every non-OR sibling
/// is distributed across every combination of branches of the OR children.
fn distribute(children: Vec<Condition>) -> Condition {
    let mut branches: Vec<Vec<Condition>> = vec![Vec::new()];
    for child in children {
        match child {
            Condition::Or(alternatives) => {
                let mut next = Vec::with_capacity(branches.len() * alternatives.len());
                for branch in &branches {
                    for alt in &alternatives {
                        let mut extended = branch.clone();
                        extended.push(alt.clone());
                        next.push(extended);
                    }
                }
                branches = next;
            }
            other => {
                for branch in &mut branches {
                    branch.push(other.clone());
                }
            }
        }
    }
    Condition::Or(branches.into_iter().map(Condition::And).collect())
}

// =============================================================================
// Branch Normalization
// =============================================================================

/// One element of a normalized conjunction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchElem {
    /// A positive fact pattern.
    Pattern(FactPattern),
    /// A negated fact pattern (negation-as-failure).
    Negated(FactPattern),
    /// A boolean test over variables bound earlier in the branch.
    Test(Predicate),
}

/// Normalizes a rule condition into independent conjunctive branches.
///
/// After DNF rewriting, each OR branch becomes one `Vec<BranchElem>`:
/// - an empty rule body becomes a single branch matching the implicit
///   initial fact;
/// - a branch beginning with a negation gets an initial-fact pattern
///   prepended (negation nodes need a positive left anchor);
/// - every branch is validated: tests may only reference variables some
///   earlier positive pattern binds, and field predicates may only
///   reference variables captured within their own pattern.
///
/// # Errors
///
/// Returns a compilation error for unsupported constructs (a NOT wrapping
/// anything but a plain pattern after rewriting) or unbound test variables.
/// Nothing is wired before validation completes, so a failing rule leaves
/// no partial network behind.
pub fn normalize(rule: &str, condition: Condition) -> Result<Vec<Vec<BranchElem>>> {
    let dnf = to_dnf(condition);

    let alternatives = match dnf {
        Condition::Or(xs) => xs,
        other => vec![other],
    };

    let mut branches = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        let elements = match alternative {
            Condition::And(xs) => xs,
            other => vec![other],
        };

        let mut branch = Vec::with_capacity(elements.len());
        for element in elements {
            branch.push(lower_element(rule, element)?);
        }

        // Zero-pattern branches match once per reset via the initial fact.
        if branch.is_empty() {
            branch.push(BranchElem::Pattern(FactPattern::initial()));
        }

        // Negation nodes never fire without a positive left input, and a
        // test needs a token stream to filter; anchor branches that do not
        // open with a positive pattern on the initial fact.
        if !matches!(branch.first(), Some(BranchElem::Pattern(_))) {
            branch.insert(0, BranchElem::Pattern(FactPattern::initial()));
        }

        validate_branch(rule, &branch)?;
        branches.push(branch);
    }

    Ok(branches)
}

fn lower_element(rule: &str, element: Condition) -> Result<BranchElem> {
    match element {
        Condition::Pattern(p) => Ok(BranchElem::Pattern(p)),
        Condition::Test(t) => Ok(BranchElem::Test(t)),
        Condition::Not(inner) => match *inner {
            Condition::Pattern(p) => Ok(BranchElem::Negated(p)),
            Condition::Test(_) => Err(Error::unsupported_condition(
                rule,
                "NOT may not wrap a boolean test",
            )),
            _ => Err(Error::unsupported_condition(
                rule,
                "NOT wraps a compound condition after rewriting",
            )),
        },
        Condition::And(_) | Condition::Or(_) => Err(Error::unsupported_condition(
            rule,
            "nested AND/OR survived rewriting",
        )),
    }
}

/// Checks variable availability along one branch.
fn validate_branch(rule: &str, branch: &[BranchElem]) -> Result<()> {
    let mut bound: Vec<SymbolId> = Vec::new();

    for element in branch {
        match element {
            BranchElem::Pattern(pattern) => {
                validate_pattern(rule, pattern)?;
                bound.extend(pattern.captures());
            }
            BranchElem::Negated(pattern) => {
                // Captures inside a negation never flow downstream.
                validate_pattern(rule, pattern)?;
            }
            BranchElem::Test(pred) => {
                for arg in &pred.args {
                    if !bound.contains(arg) {
                        return Err(Error::unbound_variable(rule, format!("{arg:?}")));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Field predicates run in the alpha network, where the token context only
/// holds captures from the same pattern; reject anything else up front.
fn validate_pattern(rule: &str, pattern: &FactPattern) -> Result<()> {
    let captures = pattern.captures();
    let mut args = Vec::new();
    for (_, test) in &pattern.fields {
        test.collect_predicate_args(&mut args);
    }
    for arg in args {
        if !captures.contains(&arg) {
            return Err(Error::unbound_variable(rule, format!("{arg:?}")));
        }
    }
    Ok(())
}
